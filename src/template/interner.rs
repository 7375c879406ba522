use std::{collections::HashSet, rc::Rc};

/// Deduplicates path segments so repeated parts share one allocation.
///
/// Interning is an optimization only: segments still compare by content, so
/// a path built without an interner behaves the same.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use morphic::template::interner::PathInterner;
///
/// let mut interner = PathInterner::new();
/// let a = interner.intern("name");
/// let b = interner.intern("name");
///
/// assert!(Rc::ptr_eq(&a, &b));
/// assert_eq!(interner.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathInterner {
    parts: HashSet<Rc<str>>,
}

impl PathInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            parts: HashSet::with_capacity(capacity),
        }
    }

    /// Returns the shared copy of `part`, storing it on first sight.
    pub fn intern(&mut self, part: &str) -> Rc<str> {
        if let Some(existing) = self.parts.get(part) {
            return Rc::clone(existing);
        }
        let part: Rc<str> = Rc::from(part);
        self.parts.insert(Rc::clone(&part));
        part
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Drops all interned parts while keeping allocated capacity.
    pub fn clear(&mut self) {
        self.parts.clear();
    }
}
