//! Pull-based value cells.
//!
//! A reference is asked for its value and for the revision of its sources.
//! Nothing is pushed: when data changes, the revision of the underlying
//! [`Model`] moves and the next revalidate notices by comparing revisions.
use std::{fmt, rc::Rc};

use crate::{
    diagnostics::{
        LookupError, MorphResult, RenderError,
        error_codes::{HELPER_SHAPE_MISMATCH, UNKNOWN_DYNAMIC_VAR},
    },
    runtime::{
        frame::{DynamicScope, Frame},
        helper::{Helper, HelperArgs, SimpleHelperFn},
        model::{CONSTANT_REVISION, Model, Revision, current_revision},
        value::Value,
    },
};

#[derive(Debug, Clone)]
pub enum Reference {
    Const(ConstReference),
    Root(RootReference),
    Property(PropertyReference),
    Concat(ConcatReference),
    Helper(HelperInvocationReference),
}

impl Reference {
    pub fn constant(value: impl Into<Value>) -> Self {
        Reference::Const(ConstReference {
            value: value.into(),
        })
    }

    pub fn root(model: Model) -> Self {
        Reference::Root(RootReference { model })
    }

    pub fn concat(parts: Vec<Reference>) -> Self {
        Reference::Concat(ConcatReference {
            parts: parts.into(),
        })
    }

    /// Reference onto member `key` of this reference's value.
    pub fn get(&self, key: &str) -> Reference {
        match self {
            Reference::Const(c) => Reference::constant(c.value.get(key)),
            _ => Reference::Property(PropertyReference {
                parent: Rc::new(self.clone()),
                key: Rc::from(key),
            }),
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Reference::Const(_))
    }

    /// Computes the current value.
    pub fn value(&self) -> MorphResult<Value> {
        match self {
            Reference::Const(c) => Ok(c.value.clone()),
            Reference::Root(r) => Ok(r.model.get()),
            Reference::Property(p) => Ok(p.parent.value()?.get(&p.key)),
            Reference::Concat(c) => c.value(),
            Reference::Helper(h) => h.value(),
        }
    }

    /// Highest revision among the sources this reference reads.
    pub fn revision(&self) -> Revision {
        match self {
            Reference::Const(_) => CONSTANT_REVISION,
            Reference::Root(r) => r.model.revision(),
            Reference::Property(p) => p.parent.revision(),
            Reference::Concat(c) => max_revision(&c.parts),
            Reference::Helper(h) => h.revision(),
        }
    }
}

fn max_revision(references: &[Reference]) -> Revision {
    references
        .iter()
        .map(Reference::revision)
        .max()
        .unwrap_or(CONSTANT_REVISION)
}

/// Fixed at construction; its revision never moves.
#[derive(Debug, Clone)]
pub struct ConstReference {
    value: Value,
}

/// Reads a [`Model`] directly. Self references are of this kind.
#[derive(Debug, Clone)]
pub struct RootReference {
    model: Model,
}

impl RootReference {
    pub fn model(&self) -> &Model {
        &self.model
    }
}

/// One `.get(key)` step over a parent reference.
#[derive(Debug, Clone)]
pub struct PropertyReference {
    parent: Rc<Reference>,
    key: Rc<str>,
}

/// Joins the text of its parts with no delimiter. `null` parts add nothing.
#[derive(Debug, Clone)]
pub struct ConcatReference {
    parts: Rc<[Reference]>,
}

impl ConcatReference {
    fn value(&self) -> MorphResult<Value> {
        let mut out = String::new();
        for part in self.parts.iter() {
            out.push_str(&part.value()?.to_string_value());
        }
        Ok(Value::from(out))
    }
}

#[derive(Clone)]
enum Invocation {
    Function(Rc<SimpleHelperFn>),
    DynamicVar(Rc<DynamicScope>),
}

/// Calls a helper over evaluated params and hash.
///
/// Its revision is the highest revision of its inputs, so it is only
/// recomputed when one of them moved.
#[derive(Clone)]
pub struct HelperInvocationReference {
    path: Rc<str>,
    invocation: Invocation,
    params: EvaluatedParams,
    host_options: Value,
}

impl HelperInvocationReference {
    pub fn new(
        path: impl Into<Rc<str>>,
        helper: Helper,
        params: EvaluatedParams,
        frame: &Frame,
        kind: &'static str,
    ) -> Result<Self, LookupError> {
        let path = path.into();
        let invocation = match helper {
            Helper::Simple(f) => Invocation::Function(f),
            Helper::DynamicVar => Invocation::DynamicVar(Rc::clone(frame.dynamic_scope())),
            Helper::Block(_) => {
                return Err(LookupError::new(HELPER_SHAPE_MISMATCH, kind, path.as_ref())
                    .with_hint("block helpers can only be used with a block or as a component"));
            }
        };
        Ok(Self {
            path,
            invocation,
            params,
            host_options: frame.scope().host_options().clone(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn value(&self) -> MorphResult<Value> {
        let (params, hash) = self.params.values()?;
        match &self.invocation {
            Invocation::Function(f) => {
                let args = HelperArgs {
                    params: &params,
                    hash: &hash,
                    host_options: &self.host_options,
                };
                f(&args).map_err(|err| RenderError::from_helper(self.path.as_ref(), err))
            }
            Invocation::DynamicVar(scope) => {
                let name = params.first().cloned().unwrap_or(Value::Null).to_string_value();
                scope
                    .lookup(&name)
                    .ok_or_else(|| {
                        RenderError::from(LookupError::new(UNKNOWN_DYNAMIC_VAR, "helper", name))
                    })?
                    .value()
            }
        }
    }

    fn revision(&self) -> Revision {
        let inputs = self.params.revision();
        match &self.invocation {
            Invocation::Function(_) => inputs,
            Invocation::DynamicVar(scope) => {
                let target = self
                    .params
                    .params
                    .first()
                    .and_then(|name| name.value().ok())
                    .and_then(|name| scope.lookup(&name.to_string_value()).map(Reference::revision));
                // An unresolvable variable forces a recompute, which reports it.
                inputs.max(target.unwrap_or_else(current_revision))
            }
        }
    }
}

impl fmt::Debug for HelperInvocationReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperInvocationReference")
            .field("path", &self.path)
            .field("params", &self.params)
            .finish()
    }
}

/// Hash entries evaluated into references, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct EvaluatedHash {
    keys: Rc<[Rc<str>]>,
    values: Vec<Reference>,
}

impl EvaluatedHash {
    pub fn new(keys: Rc<[Rc<str>]>, values: Vec<Reference>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        Self { keys, values }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &Reference)> {
        self.keys.iter().zip(self.values.iter())
    }

    pub fn get(&self, name: &str) -> Option<&Reference> {
        self.iter()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, reference)| reference)
    }

    pub fn revision(&self) -> Revision {
        max_revision(&self.values)
    }

    pub fn values(&self) -> MorphResult<Vec<(Rc<str>, Value)>> {
        self.iter()
            .map(|(key, reference)| Ok((Rc::clone(key), reference.value()?)))
            .collect()
    }
}

/// Positional params and hash of one invocation, evaluated once and shared
/// by the morph they were built for.
#[derive(Debug, Clone, Default)]
pub struct EvaluatedParams {
    pub params: Vec<Reference>,
    pub hash: EvaluatedHash,
}

impl EvaluatedParams {
    pub fn revision(&self) -> Revision {
        max_revision(&self.params).max(self.hash.revision())
    }

    #[allow(clippy::type_complexity)]
    pub fn values(&self) -> MorphResult<(Vec<Value>, Vec<(Rc<str>, Value)>)> {
        let params = self
            .params
            .iter()
            .map(Reference::value)
            .collect::<MorphResult<Vec<_>>>()?;
        Ok((params, self.hash.values()?))
    }
}

/// Outcome of asking a cached reference whether it changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Sources did not move; nothing was recomputed.
    Fresh,
    /// Sources moved but the recomputed value is equal to the last one.
    Unchanged,
    /// The value differs from the last one.
    Changed,
}

/// A reference plus the revision and value it had when last read.
#[derive(Debug, Clone)]
pub struct CachedReference {
    reference: Reference,
    revision: Revision,
    value: Value,
}

impl CachedReference {
    /// Reads `reference` for the first time.
    pub fn compute(reference: Reference) -> MorphResult<Self> {
        let revision = reference.revision();
        let value = reference.value()?;
        Ok(Self {
            reference,
            revision,
            value,
        })
    }

    /// Value as of the last read.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn revalidate(&mut self) -> MorphResult<Validation> {
        let revision = self.reference.revision();
        if revision == self.revision {
            return Ok(Validation::Fresh);
        }
        let value = self.reference.value()?;
        self.revision = revision;
        if value.same(&self.value) {
            return Ok(Validation::Unchanged);
        }
        self.value = value;
        Ok(Validation::Changed)
    }
}

