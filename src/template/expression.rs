use std::rc::Rc;

use crate::{
    diagnostics::MorphResult,
    runtime::{
        frame::Frame,
        reference::{HelperInvocationReference, Reference},
        value::Value,
    },
    template::{hash::Params, path::Path},
};

/// A pure computation over the current frame that produces a reference.
#[derive(Debug, Clone)]
pub enum Expression {
    /// Literal; the only static expression.
    Value(Value),
    /// Path lookup against the scope.
    Get(Path),
    /// Helper call. The helper is looked up when evaluated.
    Helper { path: Path, params: Rc<Params> },
    /// Delimiter-free string join of its parts.
    Concat(Vec<Expression>),
}

impl Expression {
    pub fn value(value: impl Into<Value>) -> Self {
        Expression::Value(value.into())
    }

    pub fn get(path: impl Into<Path>) -> Self {
        Expression::Get(path.into())
    }

    pub fn helper(path: impl Into<Path>, params: Params) -> Self {
        Expression::Helper {
            path: path.into(),
            params: Rc::new(params),
        }
    }

    pub fn concat(parts: Vec<Expression>) -> Self {
        Expression::Concat(parts)
    }

    /// Static expressions produce the same value on every render.
    pub fn is_static(&self) -> bool {
        matches!(self, Expression::Value(_))
    }

    /// The literal of a static expression.
    pub fn static_value(&self) -> Option<&Value> {
        match self {
            Expression::Value(value) => Some(value),
            _ => None,
        }
    }

    /// `kind` is the statement kind reported if a lookup fails.
    pub fn evaluate(&self, frame: &Frame, kind: &'static str) -> MorphResult<Reference> {
        match self {
            Expression::Value(value) => Ok(Reference::constant(value.clone())),
            Expression::Get(path) => Ok(frame.resolve_path(path, kind)?),
            Expression::Helper { path, params } => {
                let helper = frame.lookup_helper(path, kind)?;
                let params = params.evaluate(frame, kind)?;
                let invocation =
                    HelperInvocationReference::new(path.to_string(), helper, params, frame, kind)?;
                Ok(Reference::Helper(invocation))
            }
            Expression::Concat(parts) => {
                let parts = parts
                    .iter()
                    .map(|part| part.evaluate(frame, kind))
                    .collect::<MorphResult<Vec<_>>>()?;
                Ok(Reference::concat(parts))
            }
        }
    }
}
