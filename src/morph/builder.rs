use std::rc::Rc;

use tracing::trace;

use crate::{
    diagnostics::{
        LookupError, MorphResult, RenderError, SpecificationError,
        error_codes::{ATTRIBUTE_OUTSIDE_ELEMENT, HELPER_SHAPE_MISMATCH, MALFORMED_STATEMENT},
    },
    morph::{
        AttrMorph, BlockMorph, FallbackMorph, MorphHandle, MorphNode, ModifierMorph, PropMorph,
        RenderContext, ValueMorph,
    },
    runtime::{
        frame::Frame,
        helper::{BlockHelperFn, Helper},
        reference::{EvaluatedParams, HelperInvocationReference, Reference},
    },
    surface::{ElementId, SlotKind, SlotOptions},
    template::{
        Template,
        path::Path,
        statement::{Statement, StatementKind, StatementNode},
    },
};

/// Walks the statements of one template in order, writing static output
/// straight to the surface and creating a morph for each dynamic statement.
pub struct Builder<'c, 'a> {
    ctx: &'c mut RenderContext<'a>,
    /// Elements opened by this template and not yet closed.
    elements: Vec<ElementId>,
}

impl<'c, 'a> Builder<'c, 'a> {
    pub fn new(ctx: &'c mut RenderContext<'a>) -> Self {
        Self {
            ctx,
            elements: Vec::new(),
        }
    }

    /// Evaluates every statement of `template` against `frame` and returns
    /// the created morphs in statement order.
    pub fn evaluate_template(
        mut self,
        template: &Template,
        frame: &Frame,
    ) -> MorphResult<Vec<MorphHandle>> {
        let mut morphs = Vec::new();
        for (index, node) in template.statements().iter().enumerate() {
            let kind = node.statement.kind();
            let morph = self.evaluate(node, frame).map_err(|err| match err {
                RenderError::Specification(err) => {
                    RenderError::Specification(err.at_statement(index, Some(kind.tag())))
                }
                other => other,
            })?;
            if let Some(morph) = morph {
                let handle = self.ctx.arena.alloc(morph);
                trace!(kind = kind.tag(), handle = handle.0, "created morph");
                morphs.push(handle);
            }
        }
        if !self.elements.is_empty() {
            return Err(SpecificationError::new(
                MALFORMED_STATEMENT,
                format!("{} element(s) opened but never closed", self.elements.len()),
            )
            .into());
        }
        Ok(morphs)
    }

    fn current_element(&self, kind: StatementKind) -> Result<ElementId, SpecificationError> {
        self.elements.last().copied().ok_or_else(|| {
            SpecificationError::new(
                ATTRIBUTE_OUTSIDE_ELEMENT,
                format!("`{}` appears outside of an open element", kind.tag()),
            )
        })
    }

    fn evaluate(&mut self, node: &StatementNode, frame: &Frame) -> MorphResult<Option<MorphNode>> {
        let kind = node.statement.kind();
        let tag = kind.tag();
        let boundaries = |slot: SlotKind| {
            SlotOptions::new(slot).with_boundaries(node.front_boundary, node.back_boundary)
        };

        let morph = match &node.statement {
            Statement::Text(content) => {
                self.ctx.surface.append_text(content)?;
                return Ok(None);
            }
            Statement::Comment(value) => {
                self.ctx.surface.append_comment(value)?;
                return Ok(None);
            }
            Statement::OpenElement(element_tag) => {
                let element = self.ctx.surface.open_element(element_tag)?;
                self.elements.push(element);
                return Ok(None);
            }
            Statement::CloseElement => {
                if self.elements.pop().is_none() {
                    return Err(SpecificationError::new(
                        MALFORMED_STATEMENT,
                        "`closeElement` without a matching `openElement`",
                    )
                    .into());
                }
                self.ctx.surface.close_element()?;
                return Ok(None);
            }
            Statement::StaticAttr(attr) => {
                let element = self.current_element(kind)?;
                if !attr.value.is_null() {
                    let value = attr.value.to_string_value();
                    match &attr.namespace {
                        Some(namespace) => self
                            .ctx
                            .surface
                            .set_attribute_ns(element, &attr.name, &value, namespace)?,
                        None => self.ctx.surface.set_attribute(element, &attr.name, &value)?,
                    }
                }
                return Ok(None);
            }
            Statement::DynamicAttr(attr) => {
                let element = self.current_element(kind)?;
                let reference = attr.value.evaluate(frame, tag)?;
                MorphNode::Attr(AttrMorph::append(
                    element,
                    Rc::clone(&attr.name),
                    attr.namespace.clone(),
                    reference,
                    self.ctx,
                )?)
            }
            Statement::DynamicProp(prop) => {
                let element = self.current_element(kind)?;
                let reference = prop.value.evaluate(frame, tag)?;
                MorphNode::Prop(PropMorph::append(
                    element,
                    Rc::clone(&prop.name),
                    reference,
                    self.ctx,
                )?)
            }
            Statement::Modifier(statement) => {
                let element = self.current_element(kind)?;
                let modifier = frame.lookup_modifier(&statement.path, tag)?;
                let params = statement.params.evaluate(frame, tag)?;
                MorphNode::Modifier(ModifierMorph::append(
                    element,
                    statement.path.clone(),
                    modifier,
                    params,
                    frame,
                    self.ctx,
                )?)
            }
            Statement::Unknown(unknown) => {
                // Whether the path names a helper is decided now, against the
                // helpers of this frame.
                let reference = if frame.has_helper(&unknown.path) {
                    let helper = frame.lookup_helper(&unknown.path, tag)?;
                    Reference::Helper(HelperInvocationReference::new(
                        unknown.path.to_string(),
                        helper,
                        EvaluatedParams::default(),
                        frame,
                        tag,
                    )?)
                } else {
                    frame.resolve_path(&unknown.path, tag)?
                };
                MorphNode::Value(ValueMorph::append(
                    reference,
                    unknown.trusting,
                    boundaries(SlotKind::Value),
                    self.ctx,
                )?)
            }
            Statement::Inline(inline) => {
                let helper = frame.lookup_helper(&inline.path, tag)?;
                let params = inline.params.evaluate(frame, tag)?;
                let reference = HelperInvocationReference::new(
                    inline.path.to_string(),
                    helper,
                    params,
                    frame,
                    tag,
                )?;
                MorphNode::Value(ValueMorph::append(
                    Reference::Helper(reference),
                    inline.trusting,
                    boundaries(SlotKind::Value),
                    self.ctx,
                )?)
            }
            Statement::Block(block) => {
                let helper = block_helper(frame, &block.path, tag)?;
                let params = block.params.evaluate(frame, tag)?;
                MorphNode::Block(BlockMorph::append(
                    block.path.clone(),
                    helper,
                    params,
                    block.templates.clone(),
                    boundaries(SlotKind::Block),
                    frame,
                    self.ctx,
                )?)
            }
            Statement::Component(component) => {
                let path = Path::from_parts(vec![Rc::clone(&component.tag)]);
                if frame.has_helper(&path) {
                    let helper = block_helper(frame, &path, tag)?;
                    let params = EvaluatedParams {
                        params: Vec::new(),
                        hash: component.hash.evaluate(frame, tag)?,
                    };
                    MorphNode::Block(BlockMorph::append(
                        path,
                        helper,
                        params,
                        component.templates.clone(),
                        boundaries(SlotKind::Block),
                        frame,
                        self.ctx,
                    )?)
                } else {
                    MorphNode::Fallback(FallbackMorph::append(component, frame, self.ctx)?)
                }
            }
        };
        Ok(Some(morph))
    }
}

fn block_helper(
    frame: &Frame,
    path: &Path,
    kind: &'static str,
) -> Result<Rc<BlockHelperFn>, LookupError> {
    match frame.lookup_helper(path, kind)? {
        Helper::Block(helper) => Ok(helper),
        Helper::Simple(_) | Helper::DynamicVar => {
            Err(LookupError::new(HELPER_SHAPE_MISMATCH, kind, path.to_string())
                .with_hint("only block helpers can render child templates"))
        }
    }
}
