use std::rc::Rc;

use tracing::trace;

use crate::{
    diagnostics::{MorphResult, RenderError},
    morph::{AttrMorph, ContentsMorph, MorphHandle, MorphNode, RenderContext, revalidate_all},
    runtime::{
        frame::Frame,
        helper::{HelperArgs, Modifier, ModifierContext},
        model::Revision,
        reference::EvaluatedParams,
        value::Value,
    },
    surface::{ElementId, SlotKind, SlotOptions},
    template::{path::Path, statement::Component},
};

/// A component whose tag is not a registered helper, rendered as a plain
/// element wrapping its default template.
///
/// Hash entries with a literal value become static attributes; the others
/// become attribute morphs.
#[derive(Debug)]
pub struct FallbackMorph {
    element: ElementId,
    children: Vec<MorphHandle>,
}

impl FallbackMorph {
    pub(crate) fn append(
        component: &Component,
        frame: &Frame,
        ctx: &mut RenderContext<'_>,
    ) -> MorphResult<Self> {
        let element = ctx.surface.open_element(&component.tag)?;
        let mut children = Vec::new();

        for (name, expression) in component.hash.iter() {
            match expression.static_value() {
                Some(value) if value.is_null() => {}
                Some(value) => {
                    ctx.surface
                        .set_attribute(element, name, &value.to_string_value())?;
                }
                None => {
                    let reference = expression.evaluate(frame, "component")?;
                    let attr = AttrMorph::append(element, Rc::clone(name), None, reference, ctx)?;
                    children.push(ctx.arena.alloc(MorphNode::Attr(attr)));
                }
            }
        }

        let default = component.templates.default.as_ref().filter(|t| !t.is_empty());
        if let Some(template) = default {
            let slot = ctx.surface.append_slot(
                SlotOptions::new(SlotKind::Contents)
                    .with_boundaries(template.front_boundary(), template.back_boundary()),
            )?;
            let body = ContentsMorph::render_body(Rc::clone(template), frame, slot, ctx)?;
            children.push(ctx.arena.alloc(MorphNode::Contents(body)));
        }

        ctx.surface.close_element()?;
        Ok(Self { element, children })
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn children(&self) -> &[MorphHandle] {
        &self.children
    }

    pub(crate) fn update(&mut self, frame: &Frame, ctx: &mut RenderContext<'_>) -> MorphResult<()> {
        revalidate_all(&self.children, frame, ctx)
    }
}

type ArgumentValues = (Vec<Value>, Vec<(Rc<str>, Value)>);

fn same_arguments(a: &ArgumentValues, b: &ArgumentValues) -> bool {
    a.0.len() == b.0.len()
        && a.1.len() == b.1.len()
        && a.0.iter().zip(&b.0).all(|(x, y)| x.same(y))
        && a.1.iter().zip(&b.1).all(|((k, x), (l, y))| k == l && x.same(y))
}

/// A modifier installed on an element. It is re-run only when the values of
/// its params or hash change.
#[derive(Debug)]
pub struct ModifierMorph {
    element: ElementId,
    path: Path,
    modifier: Modifier,
    params: EvaluatedParams,
    host_options: Value,
    revision: Revision,
    last: ArgumentValues,
}

impl ModifierMorph {
    pub(crate) fn append(
        element: ElementId,
        path: Path,
        modifier: Modifier,
        params: EvaluatedParams,
        frame: &Frame,
        ctx: &mut RenderContext<'_>,
    ) -> MorphResult<Self> {
        let revision = params.revision();
        let last = params.values()?;
        let morph = Self {
            element,
            path,
            modifier,
            params,
            host_options: frame.scope().host_options().clone(),
            revision,
            last,
        };
        morph.run(true, ctx)?;
        Ok(morph)
    }

    pub(crate) fn update(&mut self, ctx: &mut RenderContext<'_>) -> MorphResult<()> {
        let revision = self.params.revision();
        if revision == self.revision {
            return Ok(());
        }
        ctx.stats.recomputed += 1;
        self.revision = revision;
        let values = self.params.values()?;
        if same_arguments(&values, &self.last) {
            return Ok(());
        }
        self.last = values;
        trace!(modifier = %self.path, "modifier inputs changed");
        ctx.stats.applied += 1;
        self.run(false, ctx)
    }

    fn run(&self, installing: bool, ctx: &mut RenderContext<'_>) -> MorphResult<()> {
        let (params, hash) = &self.last;
        let args = HelperArgs {
            params,
            hash,
            host_options: &self.host_options,
        };
        let mut context = ModifierContext::new(self.element, installing, &mut *ctx.surface);
        (self.modifier.0)(&mut context, &args)
            .map_err(|err| RenderError::from_helper(self.path.to_string(), err))
    }
}
