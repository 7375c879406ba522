use std::rc::Rc;

use crate::{
    diagnostics::MorphResult,
    runtime::{
        frame::Frame,
        reference::{EvaluatedHash, EvaluatedParams},
    },
    template::expression::Expression,
};

/// Ordered `name -> expression` mapping.
#[derive(Debug, Clone, Default)]
pub struct Hash {
    keys: Rc<[Rc<str>]>,
    values: Vec<Expression>,
}

impl Hash {
    pub fn new(entries: Vec<(Rc<str>, Expression)>) -> Self {
        let (keys, values): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
        Self {
            keys: keys.into(),
            values,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &Expression)> {
        self.keys.iter().zip(self.values.iter())
    }

    pub fn evaluate(&self, frame: &Frame, kind: &'static str) -> MorphResult<EvaluatedHash> {
        let values = self
            .values
            .iter()
            .map(|value| value.evaluate(frame, kind))
            .collect::<MorphResult<Vec<_>>>()?;
        Ok(EvaluatedHash::new(Rc::clone(&self.keys), values))
    }
}

/// Positional params plus hash of a helper, block or modifier invocation.
#[derive(Debug, Clone, Default)]
pub struct Params {
    pub params: Vec<Expression>,
    pub hash: Hash,
}

impl Params {
    pub fn new(params: Vec<Expression>, hash: Hash) -> Self {
        Self { params, hash }
    }

    pub fn evaluate(&self, frame: &Frame, kind: &'static str) -> MorphResult<EvaluatedParams> {
        let params = self
            .params
            .iter()
            .map(|param| param.evaluate(frame, kind))
            .collect::<MorphResult<Vec<_>>>()?;
        Ok(EvaluatedParams {
            params,
            hash: self.hash.evaluate(frame, kind)?,
        })
    }
}
