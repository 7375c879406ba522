//! The narrow mutation contract between the morph tree and an element tree.
//!
//! The runtime calls these operations in statement order and never inspects
//! the surface's internal representation. Replaceable regions are exposed as
//! slots: a slot is a bounded range of siblings that can be cleared, refilled
//! or removed as a unit, so incremental updates never need to know where the
//! neighbouring nodes live.
use std::{error::Error, fmt};

use crate::runtime::value::Value;

pub mod memory;

pub use memory::{DomError, MemorySurface};

/// Opaque handle to an element created through [`OutputSurface::open_element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u32);

/// Opaque handle to a slot created through [`OutputSurface::append_slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub u32);

/// What a slot is going to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// A single text or trusted-HTML value.
    Value,
    /// The output of a block helper: one child slot per yield.
    Block,
    /// One yielded template instance inside a block.
    Yield,
    /// The body of an element rendered as a component fallback.
    Contents,
}

/// Options passed when a slot is created.
///
/// The boundary flags describe the template that will be rendered into the
/// slot: when set, the first (or last) node of that content is itself a
/// replaceable region and may move across rerenders, so a surface that
/// tracks sibling anchors has to keep one of its own at that edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOptions {
    pub kind: SlotKind,
    pub front_boundary: bool,
    pub back_boundary: bool,
}

impl SlotOptions {
    pub fn new(kind: SlotKind) -> Self {
        Self {
            kind,
            front_boundary: false,
            back_boundary: false,
        }
    }

    pub fn with_boundaries(mut self, front: bool, back: bool) -> Self {
        self.front_boundary = front;
        self.back_boundary = back;
        self
    }
}

/// Content written into a value slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotContent<'a> {
    /// Escaped text.
    Text(&'a str),
    /// Trusted markup inserted as-is.
    Html(&'a str),
}

/// Error raised by an output surface.
///
/// The runtime wraps it once and never inspects it.
#[derive(Debug)]
pub struct SurfaceError {
    source: Box<dyn Error + Send + Sync + 'static>,
}

impl SurfaceError {
    pub fn new<E>(source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            source: Box::new(source),
        }
    }

    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self {
            source: message.into(),
        }
    }

    /// Returns the surface-specific error if it has type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        self.source.downcast_ref::<E>()
    }
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.source, f)
    }
}

impl Error for SurfaceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.source()
    }
}

impl From<DomError> for SurfaceError {
    fn from(err: DomError) -> Self {
        SurfaceError::new(err)
    }
}

/// Mutable element tree the morph tree writes to.
///
/// Element-building calls (`open_element`, `append_*`) act at the current
/// insertion point. Attribute and property calls name their element
/// explicitly so that they can be replayed after the element was closed.
pub trait OutputSurface {
    fn open_element(&mut self, tag: &str) -> Result<ElementId, SurfaceError>;

    fn close_element(&mut self) -> Result<(), SurfaceError>;

    fn set_attribute(
        &mut self,
        element: ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), SurfaceError>;

    fn set_attribute_ns(
        &mut self,
        element: ElementId,
        name: &str,
        value: &str,
        namespace: &str,
    ) -> Result<(), SurfaceError>;

    /// Removes `name` if it was set under `namespace`. Anything else is a no-op.
    fn remove_attribute(
        &mut self,
        element: ElementId,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<(), SurfaceError>;

    fn set_property(
        &mut self,
        element: ElementId,
        name: &str,
        value: &Value,
    ) -> Result<(), SurfaceError>;

    fn append_text(&mut self, content: &str) -> Result<(), SurfaceError>;

    fn append_comment(&mut self, value: &str) -> Result<(), SurfaceError>;

    /// Creates an empty slot at the insertion point.
    fn append_slot(&mut self, options: SlotOptions) -> Result<SlotId, SurfaceError>;

    /// Replaces everything inside `slot` with `content`.
    fn set_slot_content(
        &mut self,
        slot: SlotId,
        content: SlotContent<'_>,
    ) -> Result<(), SurfaceError>;

    /// Removes everything inside `slot`, keeping the slot itself.
    fn clear_slot(&mut self, slot: SlotId) -> Result<(), SurfaceError>;

    /// Moves the insertion point to the end of `slot`.
    fn enter_slot(&mut self, slot: SlotId) -> Result<(), SurfaceError>;

    /// Restores the insertion point saved by the matching `enter_slot`.
    fn exit_slot(&mut self) -> Result<(), SurfaceError>;

    /// Removes `slot` and its content from the tree.
    fn remove_slot(&mut self, slot: SlotId) -> Result<(), SurfaceError>;
}
