//! Error taxonomy for specification loading and rendering.
//!
//! Nothing here is retried. A failed statement evaluation aborts the current
//! render or revalidate pass and the live tree must be discarded by the caller.
use std::fmt;

use thiserror::Error;

use crate::surface::SurfaceError;

pub mod error_codes;

pub use error_codes::ErrorCode;

pub type MorphResult<T> = Result<T, RenderError>;

/// Top-level error returned by loading, `render`, `revalidate` and `rerender`.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Specification(#[from] SpecificationError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("helper `{path}` failed: {message}")]
    Helper { path: String, message: String },
    /// Failure reported by the output surface, passed through untouched.
    #[error(transparent)]
    OutputSurface(#[from] SurfaceError),
}

impl RenderError {
    /// Converts a helper or modifier failure, keeping surface errors intact.
    pub fn from_helper(path: impl Into<String>, error: HelperError) -> Self {
        match error {
            HelperError::Surface(source) => RenderError::OutputSurface(source),
            HelperError::Message(message) => RenderError::Helper {
                path: path.into(),
                message,
            },
        }
    }

    /// Returns the stable code for specification and lookup failures.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            RenderError::Specification(err) => Some(err.code.code),
            RenderError::Lookup(err) => Some(err.code.code),
            RenderError::Helper { .. } | RenderError::OutputSurface(_) => None,
        }
    }
}

/// Malformed or internally inconsistent specification. Always fatal.
#[derive(Debug, Clone, Error)]
pub struct SpecificationError {
    pub code: ErrorCode,
    pub message: String,
    /// Index of the template within the specification document.
    pub template: Option<usize>,
    /// Index of the statement within its template.
    pub statement: Option<usize>,
    /// Statement tag as written in the specification.
    pub kind: Option<String>,
    pub hint: Option<String>,
}

impl SpecificationError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            template: None,
            statement: None,
            kind: None,
            hint: None,
        }
    }

    pub fn in_template(mut self, template: usize) -> Self {
        self.template.get_or_insert(template);
        self
    }

    pub fn at_statement(mut self, statement: usize, kind: Option<&str>) -> Self {
        self.statement.get_or_insert(statement);
        if self.kind.is_none() {
            self.kind = kind.map(str::to_string);
        }
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for SpecificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        let mut location = Vec::new();
        if let Some(template) = self.template {
            location.push(format!("template {}", template));
        }
        if let Some(statement) = self.statement {
            location.push(format!("statement {}", statement));
        }
        if let Some(kind) = &self.kind {
            location.push(format!("`{}`", kind));
        }
        if !location.is_empty() {
            write!(f, " ({})", location.join(", "))?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\nhint: {}", hint)?;
        }
        Ok(())
    }
}

/// A path, helper or modifier name did not resolve against the current frame.
#[derive(Debug, Clone, Error)]
pub struct LookupError {
    pub code: ErrorCode,
    /// Statement kind that triggered the lookup, e.g. `unknown`.
    pub kind: &'static str,
    /// Dotted path that failed to resolve.
    pub path: String,
    pub hint: Option<String>,
}

impl LookupError {
    pub fn new(code: ErrorCode, kind: &'static str, path: impl Into<String>) -> Self {
        Self {
            code,
            kind,
            path: path.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: `{}` in {} statement",
            self.code, self.path, self.kind
        )?;
        if let Some(hint) = &self.hint {
            write!(f, "\nhint: {}", hint)?;
        }
        Ok(())
    }
}

/// Failure raised by user helper or modifier code.
#[derive(Debug, Error)]
pub enum HelperError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

impl HelperError {
    pub fn new(message: impl Into<String>) -> Self {
        HelperError::Message(message.into())
    }
}

#[cfg(test)]
mod diagnostics_test;
