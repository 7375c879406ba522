//! Top-level render, revalidate and rerender.
//!
//! A render builds the root scope and frame, walks the template once and
//! keeps the resulting morph tree. Afterwards [`RenderResult::revalidate`] and
//! [`RenderResult::rerender`] are the only ways back in; both update the tree
//! in place. Calls on one result must not overlap.
use std::rc::Rc;

use tracing::{debug, instrument};

use crate::{
    diagnostics::MorphResult,
    morph::{Builder, MorphArena, MorphHandle, RenderContext, revalidate_all},
    runtime::{
        environment::Environment, frame::Frame, model::Model, reference::Reference,
        value::Value,
    },
    surface::OutputSurface,
    template::Template,
};

/// Inputs of a top-level render besides `self`.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Passed through to helpers and modifiers untouched.
    pub host_options: Value,
    /// Initial dynamic variables, read by `-get-dynamic-var`.
    pub dynamic_vars: Vec<(Rc<str>, Value)>,
    /// Bound by position to the template's locals.
    pub block_arguments: Vec<Value>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host_options(mut self, host_options: impl Into<Value>) -> Self {
        self.host_options = host_options.into();
        self
    }

    pub fn dynamic_var(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.dynamic_vars.push((Rc::from(name), value.into()));
        self
    }

    pub fn block_arguments(mut self, arguments: Vec<Value>) -> Self {
        self.block_arguments = arguments;
        self
    }
}

/// Work done by one revalidate or rerender pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevalidateStats {
    /// Morphs asked whether their inputs moved.
    pub visited: usize,
    /// Morphs whose inputs moved and were recomputed.
    pub recomputed: usize,
    /// Output operations applied because a value actually changed.
    pub applied: usize,
}

#[derive(Debug)]
struct LiveTree {
    arena: MorphArena,
    roots: Vec<MorphHandle>,
    frame: Frame,
    self_model: Option<Model>,
}

/// The live morph tree of one render.
#[derive(Debug)]
pub struct RenderResult {
    /// `None` for an empty template, which keeps no state at all.
    tree: Option<LiveTree>,
}

impl RenderResult {
    fn empty() -> Self {
        Self { tree: None }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_none()
    }

    /// Number of live morphs.
    pub fn morph_count(&self) -> usize {
        self.tree.as_ref().map_or(0, |tree| tree.arena.len())
    }

    /// Model bound to `self`, if the render kept any state.
    pub fn self_model(&self) -> Option<&Model> {
        self.tree.as_ref()?.self_model.as_ref()
    }

    /// Re-checks every morph and applies only changed output.
    #[instrument(level = "debug", skip_all)]
    pub fn revalidate(&mut self, surface: &mut dyn OutputSurface) -> MorphResult<RevalidateStats> {
        let Some(tree) = self.tree.as_mut() else {
            return Ok(RevalidateStats::default());
        };
        let mut ctx = RenderContext::new(&mut tree.arena, surface);
        revalidate_all(&tree.roots, &tree.frame, &mut ctx)?;
        let stats = ctx.stats();
        debug!(
            visited = stats.visited,
            recomputed = stats.recomputed,
            applied = stats.applied,
            "revalidated"
        );
        Ok(stats)
    }

    /// Replaces the value of `self` and revalidates. A render without
    /// `self` ignores the new value.
    pub fn rerender(
        &mut self,
        surface: &mut dyn OutputSurface,
        new_self: impl Into<Value>,
    ) -> MorphResult<RevalidateStats> {
        if let Some(model) = self.self_model() {
            model.set(new_self);
        }
        self.revalidate(surface)
    }
}

/// A render result that owns the surface it rendered into.
#[derive(Debug)]
pub struct TopLevelRenderResult<S> {
    result: RenderResult,
    surface: S,
}

impl<S: OutputSurface> TopLevelRenderResult<S> {
    pub fn revalidate(&mut self) -> MorphResult<RevalidateStats> {
        self.result.revalidate(&mut self.surface)
    }

    pub fn rerender(&mut self, new_self: impl Into<Value>) -> MorphResult<RevalidateStats> {
        self.result.rerender(&mut self.surface, new_self)
    }

    pub fn result(&self) -> &RenderResult {
        &self.result
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

impl Template {
    /// Renders into `surface` and keeps it with the result.
    ///
    /// Without a `self` model, only block locals resolve and every other
    /// path is a lookup error.
    pub fn render<S: OutputSurface>(
        self: &Rc<Self>,
        env: &Environment,
        self_model: impl Into<Option<Model>>,
        mut surface: S,
        options: RenderOptions,
    ) -> MorphResult<TopLevelRenderResult<S>> {
        let result = self.render_in(env, self_model, &mut surface, options)?;
        Ok(TopLevelRenderResult { result, surface })
    }

    /// Renders at the current insertion point of a surface owned elsewhere.
    #[instrument(level = "debug", skip_all, fields(statements = self.statements().len()))]
    pub fn render_in(
        self: &Rc<Self>,
        env: &Environment,
        self_model: impl Into<Option<Model>>,
        surface: &mut dyn OutputSurface,
        options: RenderOptions,
    ) -> MorphResult<RenderResult> {
        if self.is_empty() {
            debug!("empty template, nothing to render");
            return Ok(RenderResult::empty());
        }
        let self_model = self_model.into();

        let block_arguments = options
            .block_arguments
            .into_iter()
            .map(Reference::constant)
            .collect();
        let scope = env.create_root_scope(
            self_model.clone(),
            self.locals(),
            block_arguments,
            options.host_options,
        );
        let dynamic_vars = options
            .dynamic_vars
            .into_iter()
            .map(|(name, value)| (name, Reference::constant(value)))
            .collect();
        let frame = env.push_frame(scope, dynamic_vars);

        let mut arena = MorphArena::new();
        let roots = {
            let mut ctx = RenderContext::new(&mut arena, surface);
            Builder::new(&mut ctx).evaluate_template(self, &frame)?
        };
        debug!(morphs = arena.len(), "rendered");

        Ok(RenderResult {
            tree: Some(LiveTree {
                arena,
                roots,
                frame,
                self_model,
            }),
        })
    }
}
