//! Immutable statement/expression model built once from a specification.
//!
//! A [`Template`] is shared (`Rc`) between every render of it and between the
//! parents that reference it as a child template. Nothing in this module
//! touches the output surface; evaluation lives in [`crate::morph`].
use std::rc::Rc;

use crate::diagnostics::SpecificationError;

pub mod builder;
pub mod cache;
pub mod expression;
pub mod hash;
pub mod interner;
pub mod path;
pub mod spec;
pub mod statement;

pub use builder::TemplateBuilder;
pub use cache::TemplateCache;
pub use expression::Expression;
pub use hash::{Hash, Params};
pub use path::Path;
pub use statement::{Statement, StatementKind, StatementNode};

#[derive(Debug)]
pub struct Template {
    statements: Vec<StatementNode>,
    locals: Vec<Rc<str>>,
    meta: serde_json::Value,
}

impl Template {
    pub fn new(statements: Vec<Statement>, locals: Vec<Rc<str>>, meta: serde_json::Value) -> Self {
        Self {
            statements: build_statements(statements),
            locals,
            meta,
        }
    }

    pub fn from_statements(statements: Vec<Statement>) -> Self {
        Self::new(statements, Vec::new(), serde_json::Value::Null)
    }

    /// Parses a specification document. See [`spec`] for accepted shapes.
    pub fn from_json(source: &str) -> Result<Rc<Template>, SpecificationError> {
        spec::load_str(source)
    }

    pub fn from_json_value(document: serde_json::Value) -> Result<Rc<Template>, SpecificationError> {
        spec::load_value(document)
    }

    pub fn statements(&self) -> &[StatementNode] {
        &self.statements
    }

    /// Block parameter names, bound by position to yielded block arguments.
    pub fn locals(&self) -> &[Rc<str>] {
        &self.locals
    }

    pub fn arity(&self) -> usize {
        self.locals.len()
    }

    pub fn meta(&self) -> &serde_json::Value {
        &self.meta
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Whether the first rendered node may move across rerenders.
    pub fn front_boundary(&self) -> bool {
        self.statements.first().is_some_and(|s| s.front_boundary)
    }

    /// Whether the last rendered node may move across rerenders.
    pub fn back_boundary(&self) -> bool {
        self.statements.last().is_some_and(|s| s.back_boundary)
    }
}

/// Wraps statements in nodes and flags the first and last one as boundaries
/// when their kind is a boundary candidate.
pub fn build_statements(statements: Vec<Statement>) -> Vec<StatementNode> {
    let last = statements.len().saturating_sub(1);
    statements
        .into_iter()
        .enumerate()
        .map(|(index, statement)| {
            let candidate = statement.kind().is_boundary_candidate();
            StatementNode {
                front_boundary: candidate && index == 0,
                back_boundary: candidate && index == last,
                statement,
            }
        })
        .collect()
}

#[cfg(test)]
mod template_test;
