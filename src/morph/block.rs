use std::{fmt, rc::Rc};

use tracing::{trace, warn};

use crate::{
    diagnostics::{MorphResult, RenderError},
    morph::{
        Builder, MorphHandle, MorphNode, RenderContext, discard, revalidate_all, revalidate_node,
    },
    runtime::{
        frame::Frame,
        helper::{BlockHelperFn, BlockKind, Blocks, HelperArgs, Yield},
        model::{Model, Revision},
        reference::{EvaluatedParams, Reference},
        scope::Scope,
        value::Value,
    },
    surface::{SlotId, SlotKind, SlotOptions},
    template::{Template, path::Path, statement::Templates},
};

/// A block helper invocation and the templates it yielded.
///
/// Each yield renders into its own slot inside the block's slot. When the
/// helper's inputs change it is run again and the new yields are matched to
/// the old ones by position: a yield of the same template keeps its subtree
/// and only has its block arguments updated, anything else is replaced.
pub struct BlockMorph {
    path: Path,
    helper: Rc<BlockHelperFn>,
    params: EvaluatedParams,
    revision: Revision,
    templates: Templates,
    slot: SlotId,
    yields: Vec<MorphHandle>,
}

impl BlockMorph {
    pub(crate) fn append(
        path: Path,
        helper: Rc<BlockHelperFn>,
        params: EvaluatedParams,
        templates: Templates,
        options: SlotOptions,
        frame: &Frame,
        ctx: &mut RenderContext<'_>,
    ) -> MorphResult<Self> {
        let revision = params.revision();
        let slot = ctx.surface.append_slot(options)?;
        let mut morph = Self {
            path,
            helper,
            params,
            revision,
            templates,
            slot,
            yields: Vec::new(),
        };
        let yields = morph.run(frame)?;
        for request in yields {
            if let Some(handle) = morph.append_yield(request, frame, ctx)? {
                morph.yields.push(handle);
            }
        }
        Ok(morph)
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Contents morphs of the current yields, in yield order.
    pub fn yields(&self) -> &[MorphHandle] {
        &self.yields
    }

    pub(crate) fn update(&mut self, frame: &Frame, ctx: &mut RenderContext<'_>) -> MorphResult<()> {
        let revision = self.params.revision();
        if revision == self.revision {
            return revalidate_all(&self.yields, frame, ctx);
        }
        ctx.stats.recomputed += 1;
        self.revision = revision;
        let requests = self.run(frame)?;
        trace!(helper = %self.path, yields = requests.len(), "block helper re-run");
        self.reconcile(requests, frame, ctx)
    }

    fn run(&self, frame: &Frame) -> MorphResult<Vec<Yield>> {
        let (params, hash) = self.params.values()?;
        let args = HelperArgs {
            params: &params,
            hash: &hash,
            host_options: frame.scope().host_options(),
        };
        let mut blocks = Blocks::new(
            self.templates.default.is_some(),
            self.templates.inverse.is_some(),
        );
        (self.helper)(&args, &mut blocks)
            .map_err(|err| RenderError::from_helper(self.path.to_string(), err))?;
        Ok(blocks.into_yields())
    }

    fn template_for(&self, block: BlockKind) -> Option<&Rc<Template>> {
        match block {
            BlockKind::Default => self.templates.default.as_ref(),
            BlockKind::Inverse => self.templates.inverse.as_ref(),
        }
    }

    fn append_yield(
        &self,
        request: Yield,
        frame: &Frame,
        ctx: &mut RenderContext<'_>,
    ) -> MorphResult<Option<MorphHandle>> {
        let Some(template) = self.template_for(request.block).cloned() else {
            return Ok(None);
        };
        ctx.surface.enter_slot(self.slot)?;
        let slot = ctx.surface.append_slot(
            SlotOptions::new(SlotKind::Yield)
                .with_boundaries(template.front_boundary(), template.back_boundary()),
        );
        ctx.surface.exit_slot()?;
        let contents = ContentsMorph::render(template, frame, slot?, request, ctx)?;
        Ok(Some(ctx.arena.alloc(MorphNode::Contents(contents))))
    }

    fn reconcile(
        &mut self,
        requests: Vec<Yield>,
        frame: &Frame,
        ctx: &mut RenderContext<'_>,
    ) -> MorphResult<()> {
        let mut previous = std::mem::take(&mut self.yields).into_iter();
        let mut next = Vec::new();

        for request in requests {
            let Some(template) = self.template_for(request.block).cloned() else {
                continue;
            };
            let Some(handle) = previous.next() else {
                if let Some(handle) = self.append_yield(request, frame, ctx)? {
                    ctx.stats.applied += 1;
                    next.push(handle);
                }
                continue;
            };

            let reused = match ctx.arena.get(handle) {
                Some(MorphNode::Contents(contents)) if contents.can_reuse(&template, &request) => {
                    contents.update_arguments(&request);
                    true
                }
                _ => false,
            };
            if reused {
                revalidate_node(handle, frame, ctx)?;
                next.push(handle);
                continue;
            }

            warn!(
                helper = %self.path,
                position = next.len(),
                "block yield changed template, replacing its content"
            );
            let Some(slot) = discard(handle, ctx) else {
                continue;
            };
            ctx.surface.clear_slot(slot)?;
            ctx.stats.applied += 1;
            let contents = ContentsMorph::render(template, frame, slot, request, ctx)?;
            next.push(ctx.arena.alloc(MorphNode::Contents(contents)));
        }

        for handle in previous {
            warn!(helper = %self.path, "block yielded fewer times, removing content");
            if let Some(slot) = discard(handle, ctx) {
                ctx.surface.remove_slot(slot)?;
                ctx.stats.applied += 1;
            }
        }

        self.yields = next;
        Ok(())
    }
}

impl fmt::Debug for BlockMorph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockMorph")
            .field("path", &self.path)
            .field("revision", &self.revision)
            .field("slot", &self.slot)
            .field("yields", &self.yields)
            .finish()
    }
}

/// One rendered instance of a template inside a slot.
///
/// It owns the frame its statements were evaluated in, binding the yielded
/// block arguments and dynamic variables to model cells so a later yield of
/// the same template can update them in place.
#[derive(Debug)]
pub struct ContentsMorph {
    slot: SlotId,
    template: Rc<Template>,
    frame: Frame,
    children: Vec<MorphHandle>,
    arguments: Vec<Model>,
    dynamic_vars: Vec<(Rc<str>, Model)>,
}

impl ContentsMorph {
    pub(crate) fn render(
        template: Rc<Template>,
        parent: &Frame,
        slot: SlotId,
        request: Yield,
        ctx: &mut RenderContext<'_>,
    ) -> MorphResult<Self> {
        let arguments: Vec<Model> = request.args.into_iter().map(Model::new).collect();
        let dynamic_vars: Vec<(Rc<str>, Model)> = request
            .dynamic_vars
            .into_iter()
            .map(|(name, value)| (name, Model::new(value)))
            .collect();

        let scope = Scope::child(
            parent.scope(),
            template.locals(),
            arguments.iter().cloned().map(Reference::root).collect(),
        );
        let frame = parent.child(scope).with_dynamic_vars(
            dynamic_vars
                .iter()
                .map(|(name, model)| (Rc::clone(name), Reference::root(model.clone())))
                .collect(),
        );

        ctx.surface.enter_slot(slot)?;
        let children = Builder::new(ctx).evaluate_template(&template, &frame);
        ctx.surface.exit_slot()?;

        Ok(Self {
            slot,
            template,
            frame,
            children: children?,
            arguments,
            dynamic_vars,
        })
    }

    /// Renders `template` with no block arguments, as the body of an element.
    pub(crate) fn render_body(
        template: Rc<Template>,
        parent: &Frame,
        slot: SlotId,
        ctx: &mut RenderContext<'_>,
    ) -> MorphResult<Self> {
        let request = Yield {
            block: BlockKind::Default,
            args: Vec::new(),
            dynamic_vars: Vec::new(),
        };
        Self::render(template, parent, slot, request, ctx)
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }

    pub fn children(&self) -> &[MorphHandle] {
        &self.children
    }

    fn can_reuse(&self, template: &Rc<Template>, request: &Yield) -> bool {
        Rc::ptr_eq(&self.template, template)
            && self.arguments.len() == request.args.len()
            && self.dynamic_vars.len() == request.dynamic_vars.len()
            && self
                .dynamic_vars
                .iter()
                .zip(&request.dynamic_vars)
                .all(|((a, _), (b, _))| a == b)
    }

    /// Writes new block arguments into the bound cells. Cells whose value is
    /// unchanged keep their revision.
    fn update_arguments(&self, request: &Yield) {
        let values = request
            .args
            .iter()
            .chain(request.dynamic_vars.iter().map(|(_, value)| value));
        let models = self
            .arguments
            .iter()
            .chain(self.dynamic_vars.iter().map(|(_, model)| model));
        let moved = models
            .zip(values)
            .filter(|(model, value)| model.set(Value::clone(value)))
            .count();
        if moved > 0 {
            trace!(slot = self.slot.0, moved, "block arguments updated");
        }
    }

    pub(crate) fn update(&mut self, ctx: &mut RenderContext<'_>) -> MorphResult<()> {
        revalidate_all(&self.children, &self.frame, ctx)
    }
}
