use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::runtime::value::Value;

/// Monotonic stamp of the last effective write to a data source.
pub type Revision = u64;

/// Revision of sources that never change.
pub const CONSTANT_REVISION: Revision = 0;

static REVISION: AtomicU64 = AtomicU64::new(CONSTANT_REVISION + 1);

/// Returns the most recently issued revision.
pub fn current_revision() -> Revision {
    REVISION.load(Ordering::Relaxed)
}

fn next_revision() -> Revision {
    REVISION.fetch_add(1, Ordering::Relaxed) + 1
}

/// Mutable data cell read by references.
///
/// A `Model` is the only place where rendered data changes. Every write that
/// actually changes the stored value stamps a fresh global revision; writes of
/// an equal value are ignored. References never subscribe to a model: they
/// compare revisions when asked, so a change becomes visible at the next
/// revalidate.
#[derive(Clone)]
pub struct Model {
    inner: Rc<ModelCell>,
}

struct ModelCell {
    value: RefCell<Value>,
    revision: Cell<Revision>,
}

impl Model {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            inner: Rc::new(ModelCell {
                value: RefCell::new(value.into()),
                revision: Cell::new(next_revision()),
            }),
        }
    }

    /// Returns the current value.
    pub fn get(&self) -> Value {
        self.inner.value.borrow().clone()
    }

    /// Revision of the last effective write.
    pub fn revision(&self) -> Revision {
        self.inner.revision.get()
    }

    /// Replaces the stored value. Returns `true` if the value changed.
    pub fn set(&self, value: impl Into<Value>) -> bool {
        let value = value.into();
        if self.inner.value.borrow().same(&value) {
            return false;
        }
        *self.inner.value.borrow_mut() = value;
        self.inner.revision.set(next_revision());
        true
    }

    /// Replaces the value at a dotted path, e.g. `person.name`.
    /// Returns `true` if the value changed.
    pub fn set_path(&self, path: &str, value: impl Into<Value>) -> bool {
        let parts: Vec<&str> = path.split('.').filter(|p| !p.is_empty()).collect();
        let updated = self.get().with_path(&parts, value.into());
        self.set(updated)
    }

    /// Whether both handles share the same cell.
    pub fn ptr_eq(&self, other: &Model) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(Value::Null)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("value", &*self.inner.value.borrow())
            .field("revision", &self.inner.revision.get())
            .finish()
    }
}

impl From<Value> for Model {
    fn from(value: Value) -> Self {
        Model::new(value)
    }
}

impl From<serde_json::Value> for Model {
    fn from(value: serde_json::Value) -> Self {
        Model::new(Value::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equal_writes_do_not_bump_revision() {
        let model = Model::new(json!({"name": "World"}));
        let before = model.revision();

        assert!(!model.set_path("name", "World"));
        assert_eq!(model.revision(), before);

        assert!(model.set_path("name", "Mars"));
        assert!(model.revision() > before);
        assert_eq!(model.get().get("name"), Value::from("Mars"));
    }

    #[test]
    fn revisions_are_global_and_increasing() {
        let a = Model::new(1);
        let b = Model::new(2);
        assert!(b.revision() > a.revision());
        a.set(3);
        assert!(a.revision() > b.revision());
        assert!(current_revision() >= a.revision());
    }

    #[test]
    fn clones_share_the_cell() {
        let a = Model::new("x");
        let b = a.clone();
        b.set("y");
        assert!(a.ptr_eq(&b));
        assert_eq!(a.get(), Value::from("y"));
    }
}
