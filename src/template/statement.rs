use std::rc::Rc;

use crate::{
    runtime::value::Value,
    template::{Template, expression::Expression, hash::Hash, hash::Params, path::Path},
};

/// One syntactic unit of a template, built once and never mutated.
#[derive(Debug, Clone)]
pub enum Statement {
    Block(Block),
    Inline(Inline),
    Unknown(Unknown),
    Modifier(ModifierStatement),
    DynamicAttr(DynamicAttr),
    DynamicProp(DynamicProp),
    Component(Component),
    Text(Rc<str>),
    Comment(Rc<str>),
    OpenElement(Rc<str>),
    CloseElement,
    StaticAttr(StaticAttr),
}

/// Discriminant of [`Statement`], carrying the specification tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Block,
    Inline,
    Unknown,
    Modifier,
    DynamicAttr,
    DynamicProp,
    Component,
    Text,
    Comment,
    OpenElement,
    CloseElement,
    StaticAttr,
}

impl StatementKind {
    pub const ALL: [StatementKind; 12] = [
        StatementKind::Block,
        StatementKind::Inline,
        StatementKind::Unknown,
        StatementKind::Modifier,
        StatementKind::DynamicAttr,
        StatementKind::DynamicProp,
        StatementKind::Component,
        StatementKind::Text,
        StatementKind::Comment,
        StatementKind::OpenElement,
        StatementKind::CloseElement,
        StatementKind::StaticAttr,
    ];

    /// Tag used in specifications and diagnostics.
    pub fn tag(self) -> &'static str {
        match self {
            StatementKind::Block => "block",
            StatementKind::Inline => "inline",
            StatementKind::Unknown => "unknown",
            StatementKind::Modifier => "modifier",
            StatementKind::DynamicAttr => "dynamicAttr",
            StatementKind::DynamicProp => "dynamicProp",
            StatementKind::Component => "component",
            StatementKind::Text => "text",
            StatementKind::Comment => "comment",
            StatementKind::OpenElement => "openElement",
            StatementKind::CloseElement => "closeElement",
            StatementKind::StaticAttr => "staticAttr",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Static statements write straight to the surface and keep no state.
    pub fn is_static(self) -> bool {
        matches!(
            self,
            StatementKind::Text
                | StatementKind::Comment
                | StatementKind::OpenElement
                | StatementKind::CloseElement
                | StatementKind::StaticAttr
        )
    }

    /// Kinds whose rendered extent may shift sibling anchors across rerenders.
    pub fn is_boundary_candidate(self) -> bool {
        matches!(
            self,
            StatementKind::Block
                | StatementKind::Inline
                | StatementKind::Unknown
                | StatementKind::Component
        )
    }
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Block(_) => StatementKind::Block,
            Statement::Inline(_) => StatementKind::Inline,
            Statement::Unknown(_) => StatementKind::Unknown,
            Statement::Modifier(_) => StatementKind::Modifier,
            Statement::DynamicAttr(_) => StatementKind::DynamicAttr,
            Statement::DynamicProp(_) => StatementKind::DynamicProp,
            Statement::Component(_) => StatementKind::Component,
            Statement::Text(_) => StatementKind::Text,
            Statement::Comment(_) => StatementKind::Comment,
            Statement::OpenElement(_) => StatementKind::OpenElement,
            Statement::CloseElement => StatementKind::CloseElement,
            Statement::StaticAttr(_) => StatementKind::StaticAttr,
        }
    }

    pub fn is_static(&self) -> bool {
        self.kind().is_static()
    }
}

/// A statement together with its position flags inside its template.
#[derive(Debug, Clone)]
pub struct StatementNode {
    pub statement: Statement,
    pub front_boundary: bool,
    pub back_boundary: bool,
}

/// Default and inverse child templates of a block or component.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    pub default: Option<Rc<Template>>,
    pub inverse: Option<Rc<Template>>,
}

/// `{{#path params}}...{{else}}...{{/path}}`
#[derive(Debug, Clone)]
pub struct Block {
    pub path: Path,
    pub params: Params,
    pub templates: Templates,
}

/// `{{path params}}` with an explicit helper call.
#[derive(Debug, Clone)]
pub struct Inline {
    pub path: Path,
    pub params: Params,
    pub trusting: bool,
}

/// `{{path}}`, which may turn out to be a helper when evaluated.
#[derive(Debug, Clone)]
pub struct Unknown {
    pub path: Path,
    pub trusting: bool,
}

#[derive(Debug, Clone)]
pub struct ModifierStatement {
    pub path: Path,
    pub params: Params,
}

#[derive(Debug, Clone)]
pub struct DynamicAttr {
    pub name: Rc<str>,
    pub value: Expression,
    pub namespace: Option<Rc<str>>,
}

#[derive(Debug, Clone)]
pub struct DynamicProp {
    pub name: Rc<str>,
    pub value: Expression,
}

/// `<tag attrs>...</tag>` that may name a block helper.
#[derive(Debug, Clone)]
pub struct Component {
    pub tag: Rc<str>,
    pub hash: Hash,
    pub templates: Templates,
}

#[derive(Debug, Clone)]
pub struct StaticAttr {
    pub name: Rc<str>,
    pub value: Value,
    pub namespace: Option<Rc<str>>,
}
