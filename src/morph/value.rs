use std::rc::Rc;

use tracing::trace;

use crate::{
    diagnostics::MorphResult,
    morph::RenderContext,
    runtime::{
        reference::{CachedReference, Reference, Validation},
        value::Value,
    },
    surface::{ElementId, OutputSurface, SlotContent, SlotId, SlotOptions, SurfaceError},
};

/// Counts a recompute and reports whether the value needs writing.
fn changed(validation: Validation, ctx: &mut RenderContext<'_>) -> bool {
    match validation {
        Validation::Fresh => false,
        Validation::Unchanged => {
            ctx.stats.recomputed += 1;
            false
        }
        Validation::Changed => {
            ctx.stats.recomputed += 1;
            ctx.stats.applied += 1;
            true
        }
    }
}

/// Text or trusted HTML produced by an `unknown` or `inline` statement.
#[derive(Debug)]
pub struct ValueMorph {
    slot: SlotId,
    reference: CachedReference,
    trusting: bool,
}

impl ValueMorph {
    pub(crate) fn append(
        reference: Reference,
        trusting: bool,
        options: SlotOptions,
        ctx: &mut RenderContext<'_>,
    ) -> MorphResult<Self> {
        let reference = CachedReference::compute(reference)?;
        let slot = ctx.surface.append_slot(options)?;
        let morph = Self {
            slot,
            reference,
            trusting,
        };
        morph.write(ctx.surface)?;
        Ok(morph)
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }

    pub fn value(&self) -> &Value {
        self.reference.value()
    }

    pub(crate) fn update(&mut self, ctx: &mut RenderContext<'_>) -> MorphResult<()> {
        if changed(self.reference.revalidate()?, ctx) {
            trace!(slot = self.slot.0, "value changed");
            self.write(ctx.surface)?;
        }
        Ok(())
    }

    fn write(&self, surface: &mut dyn OutputSurface) -> Result<(), SurfaceError> {
        let text = self.reference.value().to_string_value();
        let content = if self.trusting {
            SlotContent::Html(&text)
        } else {
            SlotContent::Text(&text)
        };
        surface.set_slot_content(self.slot, content)
    }
}

/// A dynamic attribute of an element. `null` removes the attribute.
#[derive(Debug)]
pub struct AttrMorph {
    element: ElementId,
    name: Rc<str>,
    namespace: Option<Rc<str>>,
    reference: CachedReference,
}

impl AttrMorph {
    pub(crate) fn append(
        element: ElementId,
        name: Rc<str>,
        namespace: Option<Rc<str>>,
        reference: Reference,
        ctx: &mut RenderContext<'_>,
    ) -> MorphResult<Self> {
        let morph = Self {
            element,
            name,
            namespace,
            reference: CachedReference::compute(reference)?,
        };
        if !morph.reference.value().is_null() {
            morph.write(ctx.surface)?;
        }
        Ok(morph)
    }

    pub(crate) fn update(&mut self, ctx: &mut RenderContext<'_>) -> MorphResult<()> {
        if changed(self.reference.revalidate()?, ctx) {
            trace!(attribute = %self.name, "attribute changed");
            self.write(ctx.surface)?;
        }
        Ok(())
    }

    fn write(&self, surface: &mut dyn OutputSurface) -> Result<(), SurfaceError> {
        let value = self.reference.value();
        if value.is_null() {
            return surface.remove_attribute(self.element, &self.name, self.namespace.as_deref());
        }
        let text = value.to_string_value();
        match &self.namespace {
            Some(namespace) => surface.set_attribute_ns(self.element, &self.name, &text, namespace),
            None => surface.set_attribute(self.element, &self.name, &text),
        }
    }
}

/// A dynamic property of an element.
#[derive(Debug)]
pub struct PropMorph {
    element: ElementId,
    name: Rc<str>,
    reference: CachedReference,
}

impl PropMorph {
    pub(crate) fn append(
        element: ElementId,
        name: Rc<str>,
        reference: Reference,
        ctx: &mut RenderContext<'_>,
    ) -> MorphResult<Self> {
        let reference = CachedReference::compute(reference)?;
        ctx.surface.set_property(element, &name, reference.value())?;
        Ok(Self {
            element,
            name,
            reference,
        })
    }

    pub(crate) fn update(&mut self, ctx: &mut RenderContext<'_>) -> MorphResult<()> {
        if changed(self.reference.revalidate()?, ctx) {
            trace!(property = %self.name, "property changed");
            ctx.surface
                .set_property(self.element, &self.name, self.reference.value())?;
        }
        Ok(())
    }
}
