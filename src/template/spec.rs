//! Loading templates from their JSON specification.
//!
//! Three document shapes are accepted:
//!
//! * a bare statement array, read as one template with no children;
//! * a template object `{ "statements": [...], "locals": [...], "meta": ... }`;
//! * an array of template objects. Child-template ids index into this list,
//!   a child must precede every template that references it, and the last
//!   entry is the root.
//!
//! Statements are positional arrays whose first element is the kind tag.
//! Expressions are literals unless they are arrays, in which case the first
//! element selects `get`, `helper`, `concat` or `value`.
use std::rc::Rc;

use serde::Deserialize;
use serde_json::Value as Json;

use crate::{
    diagnostics::{
        SpecificationError,
        error_codes::{
            EMPTY_PATH, INVALID_TEMPLATE_ID, MALFORMED_DOCUMENT, MALFORMED_HASH,
            MALFORMED_STATEMENT, UNKNOWN_EXPRESSION, UNKNOWN_STATEMENT,
        },
    },
    runtime::value::Value,
    template::{
        Template,
        expression::Expression,
        hash::{Hash, Params},
        interner::PathInterner,
        path::Path,
        statement::{
            Block, Component, DynamicAttr, DynamicProp, Inline, ModifierStatement, StaticAttr,
            Statement, StatementKind, Templates, Unknown,
        },
    },
};

type SpecResult<T> = Result<T, SpecificationError>;

/// One template entry of a specification document.
#[derive(Debug, Deserialize)]
pub struct TemplateSpec {
    pub statements: Vec<Json>,
    #[serde(default)]
    pub locals: Vec<String>,
    #[serde(default)]
    pub meta: Json,
}

pub fn load_str(source: &str) -> SpecResult<Rc<Template>> {
    let document: Json = serde_json::from_str(source).map_err(|err| {
        SpecificationError::new(MALFORMED_DOCUMENT, format!("invalid JSON: {}", err))
    })?;
    load_value(document)
}

pub fn load_value(document: Json) -> SpecResult<Rc<Template>> {
    let specs = split_document(document)?;
    let mut reader = SpecReader::new();
    for (index, spec) in specs.into_iter().enumerate() {
        let template = reader.read_template(spec).map_err(|err| err.in_template(index))?;
        reader.templates.push(Rc::new(template));
    }
    reader.templates.pop().ok_or_else(|| {
        SpecificationError::new(MALFORMED_DOCUMENT, "program contains no templates")
    })
}

fn split_document(document: Json) -> SpecResult<Vec<TemplateSpec>> {
    match document {
        Json::Array(items) if items.first().is_some_and(Json::is_object) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| parse_template_spec(item).map_err(|err| err.in_template(index)))
            .collect(),
        Json::Array(statements) => Ok(vec![TemplateSpec {
            statements,
            locals: Vec::new(),
            meta: Json::Null,
        }]),
        object @ Json::Object(_) => Ok(vec![parse_template_spec(object)?]),
        other => Err(SpecificationError::new(
            MALFORMED_DOCUMENT,
            format!("expected a statement array or template object, got {}", json_kind(&other)),
        )),
    }
}

fn parse_template_spec(item: Json) -> SpecResult<TemplateSpec> {
    serde_json::from_value(item).map_err(|err| {
        SpecificationError::new(MALFORMED_DOCUMENT, format!("invalid template: {}", err))
    })
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

/// Positional fields of one statement, after the kind tag.
struct Fields<'a> {
    tag: &'a str,
    values: &'a [Json],
}

impl<'a> Fields<'a> {
    fn required(&self, index: usize) -> SpecResult<&'a Json> {
        self.values.get(index).ok_or_else(|| {
            SpecificationError::new(
                MALFORMED_STATEMENT,
                format!("`{}` is missing field {}", self.tag, index + 1),
            )
        })
    }

    /// Missing fields and `null` both read as absent.
    fn optional(&self, index: usize) -> Option<&'a Json> {
        self.values.get(index).filter(|value| !value.is_null())
    }

    fn string(&self, index: usize) -> SpecResult<&'a str> {
        self.required(index)?.as_str().ok_or_else(|| {
            SpecificationError::new(
                MALFORMED_STATEMENT,
                format!("`{}` field {} must be a string", self.tag, index + 1),
            )
        })
    }

    fn optional_string(&self, index: usize) -> SpecResult<Option<&'a str>> {
        match self.optional(index) {
            None => Ok(None),
            Some(value) => value.as_str().map(Some).ok_or_else(|| {
                SpecificationError::new(
                    MALFORMED_STATEMENT,
                    format!("`{}` field {} must be a string or null", self.tag, index + 1),
                )
            }),
        }
    }

    fn flag(&self, index: usize) -> SpecResult<bool> {
        match self.optional(index) {
            None => Ok(false),
            Some(value) => value.as_bool().ok_or_else(|| {
                SpecificationError::new(
                    MALFORMED_STATEMENT,
                    format!("`{}` field {} must be a boolean", self.tag, index + 1),
                )
            }),
        }
    }
}

/// Builds statements in document order, keeping the templates read so far
/// so later ones can reference them by index.
struct SpecReader {
    interner: PathInterner,
    templates: Vec<Rc<Template>>,
}

impl SpecReader {
    fn new() -> Self {
        Self {
            interner: PathInterner::new(),
            templates: Vec::new(),
        }
    }

    fn read_template(&mut self, spec: TemplateSpec) -> SpecResult<Template> {
        let mut statements = Vec::with_capacity(spec.statements.len());
        for (index, node) in spec.statements.iter().enumerate() {
            let statement = self
                .read_statement(node)
                .map_err(|err| err.at_statement(index, statement_tag(node)))?;
            statements.push(statement);
        }
        let locals = spec
            .locals
            .iter()
            .map(|local| self.interner.intern(local))
            .collect();
        Ok(Template::new(statements, locals, spec.meta))
    }

    fn read_statement(&mut self, node: &Json) -> SpecResult<Statement> {
        let items = node.as_array().ok_or_else(|| {
            SpecificationError::new(MALFORMED_STATEMENT, "statement must be an array")
        })?;
        let tag = items.first().and_then(Json::as_str).ok_or_else(|| {
            SpecificationError::new(MALFORMED_STATEMENT, "statement must start with a kind tag")
        })?;
        let kind = StatementKind::from_tag(tag).ok_or_else(|| {
            SpecificationError::new(UNKNOWN_STATEMENT, format!("unknown statement kind `{}`", tag))
                .with_hint(
                    "expected one of block, inline, unknown, modifier, dynamicAttr, dynamicProp, \
                     component, text, comment, openElement, closeElement, staticAttr",
                )
        })?;
        let fields = Fields {
            tag,
            values: &items[1..],
        };

        let statement = match kind {
            StatementKind::Block => Statement::Block(Block {
                path: self.path(fields.required(0)?)?,
                params: self.params(fields.optional(1), fields.optional(2))?,
                templates: self.templates(fields.optional(3), fields.optional(4))?,
            }),
            StatementKind::Inline => Statement::Inline(Inline {
                path: self.path(fields.required(0)?)?,
                params: self.params(fields.optional(1), fields.optional(2))?,
                trusting: fields.flag(3)?,
            }),
            StatementKind::Unknown => Statement::Unknown(Unknown {
                path: self.path(fields.required(0)?)?,
                trusting: fields.flag(1)?,
            }),
            StatementKind::Modifier => Statement::Modifier(ModifierStatement {
                path: self.path(fields.required(0)?)?,
                params: self.params(fields.optional(1), fields.optional(2))?,
            }),
            StatementKind::DynamicAttr => Statement::DynamicAttr(DynamicAttr {
                name: Rc::from(fields.string(0)?),
                value: self.expression(fields.required(1)?)?,
                namespace: fields.optional_string(2)?.map(Rc::from),
            }),
            // A namespace field, if present, has no meaning for properties.
            StatementKind::DynamicProp => Statement::DynamicProp(DynamicProp {
                name: Rc::from(fields.string(0)?),
                value: self.expression(fields.required(1)?)?,
            }),
            StatementKind::Component => Statement::Component(Component {
                tag: Rc::from(fields.string(0)?),
                hash: self.hash(fields.optional(1))?,
                templates: self.templates(fields.optional(2), fields.optional(3))?,
            }),
            StatementKind::Text => Statement::Text(Rc::from(fields.string(0)?)),
            StatementKind::Comment => Statement::Comment(Rc::from(fields.string(0)?)),
            StatementKind::OpenElement => Statement::OpenElement(Rc::from(fields.string(0)?)),
            StatementKind::CloseElement => Statement::CloseElement,
            StatementKind::StaticAttr => Statement::StaticAttr(StaticAttr {
                name: Rc::from(fields.string(0)?),
                value: Value::from(fields.required(1)?.clone()),
                namespace: fields.optional_string(2)?.map(Rc::from),
            }),
        };
        Ok(statement)
    }

    fn expression(&mut self, node: &Json) -> SpecResult<Expression> {
        let Some(items) = node.as_array() else {
            return Ok(Expression::Value(Value::from(node.clone())));
        };
        let tag = items.first().and_then(Json::as_str).ok_or_else(|| {
            SpecificationError::new(UNKNOWN_EXPRESSION, "expression array must start with a kind tag")
        })?;
        let missing = |index: usize| {
            SpecificationError::new(
                MALFORMED_STATEMENT,
                format!("`{}` expression is missing field {}", tag, index),
            )
        };
        match tag {
            "value" => Ok(Expression::Value(Value::from(
                items.get(1).cloned().unwrap_or(Json::Null),
            ))),
            "get" => Ok(Expression::Get(self.path(items.get(1).ok_or_else(|| missing(1))?)?)),
            "helper" => {
                let path = self.path(items.get(1).ok_or_else(|| missing(1))?)?;
                let params = self.params(
                    items.get(2).filter(|v| !v.is_null()),
                    items.get(3).filter(|v| !v.is_null()),
                )?;
                Ok(Expression::Helper {
                    path,
                    params: Rc::new(params),
                })
            }
            "concat" => {
                let parts = self.expressions(items.get(1).filter(|v| !v.is_null()))?;
                Ok(Expression::Concat(parts))
            }
            other => Err(SpecificationError::new(
                UNKNOWN_EXPRESSION,
                format!("unknown expression kind `{}`", other),
            )
            .with_hint("expected one of get, helper, concat, value")),
        }
    }

    fn expressions(&mut self, node: Option<&Json>) -> SpecResult<Vec<Expression>> {
        let Some(node) = node else {
            return Ok(Vec::new());
        };
        let items = node.as_array().ok_or_else(|| {
            SpecificationError::new(MALFORMED_STATEMENT, "params must be an array")
        })?;
        items.iter().map(|item| self.expression(item)).collect()
    }

    fn params(&mut self, params: Option<&Json>, hash: Option<&Json>) -> SpecResult<Params> {
        Ok(Params::new(self.expressions(params)?, self.hash(hash)?))
    }

    /// Reads a flat `[name, expr, name, expr, ...]` array.
    fn hash(&mut self, node: Option<&Json>) -> SpecResult<Hash> {
        let Some(node) = node else {
            return Ok(Hash::empty());
        };
        let items = node
            .as_array()
            .ok_or_else(|| SpecificationError::new(MALFORMED_HASH, "hash must be an array"))?;
        if items.len() % 2 != 0 {
            return Err(SpecificationError::new(
                MALFORMED_HASH,
                format!("hash has {} entries, expected name/value pairs", items.len()),
            ));
        }
        let mut entries = Vec::with_capacity(items.len() / 2);
        for pair in items.chunks_exact(2) {
            let name = pair[0].as_str().ok_or_else(|| {
                SpecificationError::new(MALFORMED_HASH, "hash names must be strings")
            })?;
            entries.push((self.interner.intern(name), self.expression(&pair[1])?));
        }
        Ok(Hash::new(entries))
    }

    /// Reads a part array or a dotted string.
    fn path(&mut self, node: &Json) -> SpecResult<Path> {
        let path = match node {
            Json::String(dotted) if !dotted.is_empty() => Path::interned(dotted, &mut self.interner),
            Json::Array(parts) if !parts.is_empty() => {
                let parts = parts
                    .iter()
                    .map(|part| {
                        part.as_str().map(|p| self.interner.intern(p)).ok_or_else(|| {
                            SpecificationError::new(MALFORMED_STATEMENT, "path parts must be strings")
                        })
                    })
                    .collect::<SpecResult<Vec<_>>>()?;
                Path::from_parts(parts)
            }
            Json::String(_) | Json::Array(_) => {
                return Err(SpecificationError::new(EMPTY_PATH, "path has no parts"));
            }
            _ => {
                return Err(SpecificationError::new(
                    MALFORMED_STATEMENT,
                    format!("path must be a string or part array, got {}", json_kind(node)),
                ));
            }
        };
        path.check()?;
        Ok(path)
    }

    fn templates(&self, default: Option<&Json>, inverse: Option<&Json>) -> SpecResult<Templates> {
        Ok(Templates {
            default: self.child_template(default)?,
            inverse: self.child_template(inverse)?,
        })
    }

    fn child_template(&self, id: Option<&Json>) -> SpecResult<Option<Rc<Template>>> {
        let Some(id) = id else {
            return Ok(None);
        };
        let index = id.as_u64().ok_or_else(|| {
            SpecificationError::new(
                INVALID_TEMPLATE_ID,
                format!("template id must be a non-negative integer, got {}", id),
            )
        })?;
        usize::try_from(index)
            .ok()
            .and_then(|index| self.templates.get(index))
            .cloned()
            .map(Some)
            .ok_or_else(|| {
                SpecificationError::new(
                    INVALID_TEMPLATE_ID,
                    format!(
                        "template id {} is out of range ({} templates defined so far)",
                        index,
                        self.templates.len()
                    ),
                )
                .with_hint("child templates must precede the template that references them")
            })
    }
}

fn statement_tag(node: &Json) -> Option<&str> {
    node.as_array()
        .and_then(|items| items.first())
        .and_then(Json::as_str)
}
