use std::{collections::HashMap, rc::Rc};

use crate::{
    diagnostics::{
        LookupError,
        error_codes::{UNKNOWN_HELPER, UNKNOWN_MODIFIER, UNRESOLVED_PATH},
    },
    runtime::{
        helper::{Helper, Modifier},
        reference::Reference,
        scope::Scope,
    },
    template::path::Path,
};

pub type HelperTable = HashMap<Rc<str>, Helper>;
pub type ModifierTable = HashMap<Rc<str>, Modifier>;

/// Variables visible to `-get-dynamic-var`, inherited by nested content.
#[derive(Debug, Default)]
pub struct DynamicScope {
    vars: Vec<(Rc<str>, Reference)>,
    parent: Option<Rc<DynamicScope>>,
}

impl DynamicScope {
    pub fn new(vars: Vec<(Rc<str>, Reference)>) -> Self {
        Self { vars, parent: None }
    }

    pub fn lookup(&self, name: &str) -> Option<&Reference> {
        self.vars
            .iter()
            .rev()
            .find(|(var, _)| var.as_ref() == name)
            .map(|(_, reference)| reference)
            .or_else(|| self.parent.as_deref().and_then(|p| p.lookup(name)))
    }
}

/// Rendering context handed explicitly to every evaluate and update call.
///
/// A frame pairs the lexical scope with the dynamic scope and the helper and
/// modifier tables that were current when the frame was pushed.
#[derive(Debug, Clone)]
pub struct Frame {
    scope: Rc<Scope>,
    dynamic: Rc<DynamicScope>,
    helpers: Rc<HelperTable>,
    modifiers: Rc<ModifierTable>,
}

impl Frame {
    pub fn new(
        scope: Rc<Scope>,
        dynamic: Rc<DynamicScope>,
        helpers: Rc<HelperTable>,
        modifiers: Rc<ModifierTable>,
    ) -> Self {
        Self {
            scope,
            dynamic,
            helpers,
            modifiers,
        }
    }

    pub fn scope(&self) -> &Rc<Scope> {
        &self.scope
    }

    pub fn dynamic_scope(&self) -> &Rc<DynamicScope> {
        &self.dynamic
    }

    /// Frame for a nested template: new lexical scope, same tables.
    pub fn child(&self, scope: Scope) -> Frame {
        Frame {
            scope: Rc::new(scope),
            dynamic: Rc::clone(&self.dynamic),
            helpers: Rc::clone(&self.helpers),
            modifiers: Rc::clone(&self.modifiers),
        }
    }

    /// Frame whose dynamic scope binds `vars` on top of the current one.
    pub fn with_dynamic_vars(&self, vars: Vec<(Rc<str>, Reference)>) -> Frame {
        if vars.is_empty() {
            return self.clone();
        }
        Frame {
            dynamic: Rc::new(DynamicScope {
                vars,
                parent: Some(Rc::clone(&self.dynamic)),
            }),
            ..self.clone()
        }
    }

    pub fn has_helper(&self, path: &Path) -> bool {
        path.is_single() && self.helpers.contains_key(path.head())
    }

    pub fn lookup_helper(&self, path: &Path, kind: &'static str) -> Result<Helper, LookupError> {
        self.helpers
            .get(path.head())
            .filter(|_| path.is_single())
            .cloned()
            .ok_or_else(|| {
                LookupError::new(UNKNOWN_HELPER, kind, path.to_string())
                    .with_hint("register the helper in the environment before rendering")
            })
    }

    pub fn lookup_modifier(
        &self,
        path: &Path,
        kind: &'static str,
    ) -> Result<Modifier, LookupError> {
        self.modifiers
            .get(path.head())
            .filter(|_| path.is_single())
            .cloned()
            .ok_or_else(|| LookupError::new(UNKNOWN_MODIFIER, kind, path.to_string()))
    }

    /// Resolves the head of `path` against the scope and chains a member read
    /// for each remaining part.
    pub fn resolve_path(&self, path: &Path, kind: &'static str) -> Result<Reference, LookupError> {
        let base = self
            .scope
            .get_base_reference(path.head())
            .ok_or_else(|| {
                LookupError::new(UNRESOLVED_PATH, kind, path.to_string())
                    .with_hint("no local, block argument or self is bound in this scope")
            })?;
        Ok(path.tail().iter().fold(base, |reference, part| reference.get(part)))
    }
}
