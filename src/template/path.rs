use std::{fmt, rc::Rc};

use crate::{
    diagnostics::{SpecificationError, error_codes::EMPTY_PATH},
    template::interner::PathInterner,
};

/// A dotted lookup path such as `person.name`, split into parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    parts: Rc<[Rc<str>]>,
}

impl Path {
    pub fn from_parts(parts: Vec<Rc<str>>) -> Self {
        Self {
            parts: parts.into(),
        }
    }

    /// Splits `dotted` on `.` and interns every part.
    pub fn interned(dotted: &str, interner: &mut PathInterner) -> Self {
        Self::from_parts(dotted.split('.').map(|p| interner.intern(p)).collect())
    }

    pub fn parts(&self) -> &[Rc<str>] {
        &self.parts
    }

    /// First part, resolved against the scope.
    pub fn head(&self) -> &str {
        self.parts.first().map(|p| p.as_ref()).unwrap_or("")
    }

    /// Remaining parts, each read as a member of the previous value.
    pub fn tail(&self) -> &[Rc<str>] {
        self.parts.get(1..).unwrap_or(&[])
    }

    /// Only single-part paths can name helpers.
    pub fn is_single(&self) -> bool {
        self.parts.len() == 1
    }

    /// Rejects paths with an empty part, such as `a..b` or ``.
    pub fn check(&self) -> Result<(), SpecificationError> {
        if self.parts.iter().any(|part| part.is_empty()) {
            return Err(SpecificationError::new(
                EMPTY_PATH,
                format!("path `{}` has an empty part", self),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}

impl From<&str> for Path {
    fn from(dotted: &str) -> Self {
        Self::from_parts(dotted.split('.').map(Rc::from).collect())
    }
}
