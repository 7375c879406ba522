use std::rc::Rc;

use crate::{
    diagnostics::SpecificationError,
    runtime::value::Value,
    template::{
        Template,
        expression::Expression,
        hash::{Hash, Params},
        path::Path,
        statement::{
            Block, Component, DynamicAttr, DynamicProp, Inline, ModifierStatement, StaticAttr,
            Statement, StatementKind, Templates, Unknown,
        },
    },
};

/// Builds a [`Template`] in code instead of from a specification.
///
/// Paths are checked the same way the JSON loader checks them. The first bad
/// path is kept and returned by [`TemplateBuilder::template`].
///
/// ```
/// use morphic::template::{Expression, TemplateBuilder};
///
/// let template = TemplateBuilder::new()
///     .open_element("p")
///     .dynamic_attr("class", Expression::get("kind"))
///     .text("Hello ")
///     .unknown("name")
///     .close_element()
///     .template()
///     .unwrap();
///
/// assert_eq!(template.statements().len(), 5);
/// ```
#[derive(Debug, Default)]
pub struct TemplateBuilder {
    statements: Vec<Statement>,
    locals: Vec<Rc<str>>,
    error: Option<SpecificationError>,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the block parameters of the template being built.
    pub fn locals(&mut self, names: &[&str]) -> &mut Self {
        self.locals = names.iter().map(|name| Rc::from(*name)).collect();
        self
    }

    pub fn statement(&mut self, statement: Statement) -> &mut Self {
        self.statements.push(statement);
        self
    }

    pub fn text(&mut self, content: &str) -> &mut Self {
        self.statement(Statement::Text(Rc::from(content)))
    }

    pub fn comment(&mut self, value: &str) -> &mut Self {
        self.statement(Statement::Comment(Rc::from(value)))
    }

    pub fn open_element(&mut self, tag: &str) -> &mut Self {
        self.statement(Statement::OpenElement(Rc::from(tag)))
    }

    pub fn close_element(&mut self) -> &mut Self {
        self.statement(Statement::CloseElement)
    }

    pub fn static_attr(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.static_attr_ns(name, value, None)
    }

    pub fn static_attr_ns(
        &mut self,
        name: &str,
        value: impl Into<Value>,
        namespace: Option<&str>,
    ) -> &mut Self {
        self.statement(Statement::StaticAttr(StaticAttr {
            name: Rc::from(name),
            value: value.into(),
            namespace: namespace.map(Rc::from),
        }))
    }

    pub fn dynamic_attr(&mut self, name: &str, value: Expression) -> &mut Self {
        self.dynamic_attr_ns(name, value, None)
    }

    pub fn dynamic_attr_ns(
        &mut self,
        name: &str,
        value: Expression,
        namespace: Option<&str>,
    ) -> &mut Self {
        self.statement(Statement::DynamicAttr(DynamicAttr {
            name: Rc::from(name),
            value,
            namespace: namespace.map(Rc::from),
        }))
    }

    pub fn dynamic_prop(&mut self, name: &str, value: Expression) -> &mut Self {
        self.statement(Statement::DynamicProp(DynamicProp {
            name: Rc::from(name),
            value,
        }))
    }

    /// `{{path}}`, escaped.
    pub fn unknown(&mut self, path: &str) -> &mut Self {
        let path = self.path(path, StatementKind::Unknown);
        self.statement(Statement::Unknown(Unknown {
            path,
            trusting: false,
        }))
    }

    /// `{{{path}}}`, written as raw HTML.
    pub fn unknown_trusted(&mut self, path: &str) -> &mut Self {
        let path = self.path(path, StatementKind::Unknown);
        self.statement(Statement::Unknown(Unknown {
            path,
            trusting: true,
        }))
    }

    pub fn inline(&mut self, path: &str, params: Params, trusting: bool) -> &mut Self {
        let path = self.path(path, StatementKind::Inline);
        self.statement(Statement::Inline(Inline {
            path,
            params,
            trusting,
        }))
    }

    pub fn block(
        &mut self,
        path: &str,
        params: Params,
        default: Option<Rc<Template>>,
        inverse: Option<Rc<Template>>,
    ) -> &mut Self {
        let path = self.path(path, StatementKind::Block);
        self.statement(Statement::Block(Block {
            path,
            params,
            templates: Templates { default, inverse },
        }))
    }

    pub fn component(
        &mut self,
        tag: &str,
        attrs: Hash,
        default: Option<Rc<Template>>,
        inverse: Option<Rc<Template>>,
    ) -> &mut Self {
        self.statement(Statement::Component(Component {
            tag: Rc::from(tag),
            hash: attrs,
            templates: Templates { default, inverse },
        }))
    }

    pub fn modifier(&mut self, path: &str, params: Params) -> &mut Self {
        let path = self.path(path, StatementKind::Modifier);
        self.statement(Statement::Modifier(ModifierStatement { path, params }))
    }

    /// Finishes the template. The builder is left empty and can be reused.
    pub fn template(&mut self) -> Result<Rc<Template>, SpecificationError> {
        let statements = std::mem::take(&mut self.statements);
        let locals = std::mem::take(&mut self.locals);
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        Ok(Rc::new(Template::new(statements, locals, serde_json::Value::Null)))
    }

    fn path(&mut self, dotted: &str, kind: StatementKind) -> Path {
        let path = Path::from(dotted);
        if self.error.is_none() {
            let index = self.statements.len();
            self.error = path
                .check()
                .err()
                .map(|err| err.at_statement(index, Some(kind.tag())));
        }
        path
    }
}
