//! Live bindings between dynamic statements and the output surface.
//!
//! Every dynamic statement occurrence produces one morph. Morphs live in a
//! [`MorphArena`] owned by the render result; a parent refers to its children
//! by [`MorphHandle`] and nothing points back up. The frame a morph was built
//! in is not stored in the morph: it is passed to `update` by whoever owns it
//! (the render result for top-level morphs, a [`ContentsMorph`] for the
//! morphs of a nested template).
use tracing::trace;

use crate::{
    diagnostics::MorphResult,
    render::RevalidateStats,
    runtime::frame::Frame,
    surface::{OutputSurface, SlotId},
};

pub mod arena;
pub mod block;
pub mod builder;
pub mod element;
pub mod value;

pub use arena::{MorphArena, MorphHandle};
pub use block::{BlockMorph, ContentsMorph};
pub use builder::Builder;
pub use element::{FallbackMorph, ModifierMorph};
pub use value::{AttrMorph, PropMorph, ValueMorph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MorphKind {
    Value,
    Attr,
    Prop,
    Block,
    Fallback,
    Contents,
    Modifier,
}

#[derive(Debug)]
pub enum MorphNode {
    Value(ValueMorph),
    Attr(AttrMorph),
    Prop(PropMorph),
    Block(BlockMorph),
    Fallback(FallbackMorph),
    Contents(ContentsMorph),
    Modifier(ModifierMorph),
}

impl MorphNode {
    pub fn kind(&self) -> MorphKind {
        match self {
            MorphNode::Value(_) => MorphKind::Value,
            MorphNode::Attr(_) => MorphKind::Attr,
            MorphNode::Prop(_) => MorphKind::Prop,
            MorphNode::Block(_) => MorphKind::Block,
            MorphNode::Fallback(_) => MorphKind::Fallback,
            MorphNode::Contents(_) => MorphKind::Contents,
            MorphNode::Modifier(_) => MorphKind::Modifier,
        }
    }

    /// Morphs owned by this one, in statement order.
    pub fn children(&self) -> Vec<MorphHandle> {
        match self {
            MorphNode::Block(block) => block.yields().to_vec(),
            MorphNode::Fallback(fallback) => fallback.children().to_vec(),
            MorphNode::Contents(contents) => contents.children().to_vec(),
            MorphNode::Value(_) | MorphNode::Attr(_) | MorphNode::Prop(_) | MorphNode::Modifier(_) => {
                Vec::new()
            }
        }
    }

    /// Slot this morph renders into, if it owns one.
    pub fn slot(&self) -> Option<SlotId> {
        match self {
            MorphNode::Value(value) => Some(value.slot()),
            MorphNode::Block(block) => Some(block.slot()),
            MorphNode::Contents(contents) => Some(contents.slot()),
            MorphNode::Attr(_) | MorphNode::Prop(_) | MorphNode::Fallback(_) | MorphNode::Modifier(_) => {
                None
            }
        }
    }

    fn update(&mut self, frame: &Frame, ctx: &mut RenderContext<'_>) -> MorphResult<()> {
        match self {
            MorphNode::Value(value) => value.update(ctx),
            MorphNode::Attr(attr) => attr.update(ctx),
            MorphNode::Prop(prop) => prop.update(ctx),
            MorphNode::Block(block) => block.update(frame, ctx),
            MorphNode::Fallback(fallback) => fallback.update(frame, ctx),
            MorphNode::Contents(contents) => contents.update(ctx),
            MorphNode::Modifier(modifier) => modifier.update(ctx),
        }
    }
}

/// Mutable state threaded through one render or revalidate pass.
pub struct RenderContext<'a> {
    pub(crate) arena: &'a mut MorphArena,
    pub(crate) surface: &'a mut dyn OutputSurface,
    pub(crate) stats: RevalidateStats,
}

impl<'a> RenderContext<'a> {
    pub fn new(arena: &'a mut MorphArena, surface: &'a mut dyn OutputSurface) -> Self {
        Self {
            arena,
            surface,
            stats: RevalidateStats::default(),
        }
    }

    pub fn stats(&self) -> RevalidateStats {
        self.stats
    }
}

/// Asks the morph at `handle` to re-check its inputs and apply deltas.
pub(crate) fn revalidate_node(
    handle: MorphHandle,
    frame: &Frame,
    ctx: &mut RenderContext<'_>,
) -> MorphResult<()> {
    let Some(mut node) = ctx.arena.take(handle) else {
        return Ok(());
    };
    ctx.stats.visited += 1;
    let result = node.update(frame, ctx);
    ctx.arena.restore(handle, node);
    result
}

/// Revalidates siblings left to right.
pub(crate) fn revalidate_all(
    handles: &[MorphHandle],
    frame: &Frame,
    ctx: &mut RenderContext<'_>,
) -> MorphResult<()> {
    for &handle in handles {
        revalidate_node(handle, frame, ctx)?;
    }
    Ok(())
}

/// Frees a morph subtree and returns the slot it rendered into.
pub(crate) fn discard(handle: MorphHandle, ctx: &mut RenderContext<'_>) -> Option<SlotId> {
    let slot = ctx.arena.get(handle).and_then(MorphNode::slot);
    trace!(handle = handle.0, "discarding morph subtree");
    ctx.arena.release(handle);
    slot
}
