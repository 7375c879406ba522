use std::rc::Rc;

use crate::runtime::{reference::Reference, value::Value};

/// Lexical bindings of one rendering context.
///
/// A scope never changes after it is built. Nested blocks get a child scope
/// that delegates unresolved names to its parent.
#[derive(Debug)]
pub struct Scope {
    self_ref: Option<Reference>,
    locals: Vec<(Rc<str>, Reference)>,
    host_options: Value,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    /// Creates the root scope of a top-level render.
    pub fn root(self_ref: Option<Reference>, host_options: Value) -> Self {
        Self {
            self_ref,
            locals: Vec::new(),
            host_options,
            parent: None,
        }
    }

    /// Binds the template's local slots to `block_arguments` by position.
    /// Slots without an argument are bound to `null`.
    pub fn init_top_level(mut self, locals: &[Rc<str>], block_arguments: Vec<Reference>) -> Self {
        self.locals = bind_locals(locals, block_arguments);
        self
    }

    /// Creates a scope for a nested template. `self` is inherited.
    pub fn child(parent: &Rc<Scope>, locals: &[Rc<str>], block_arguments: Vec<Reference>) -> Self {
        Self {
            self_ref: None,
            locals: bind_locals(locals, block_arguments),
            host_options: parent.host_options.clone(),
            parent: Some(Rc::clone(parent)),
        }
    }

    pub fn self_reference(&self) -> Option<&Reference> {
        match &self.self_ref {
            Some(reference) => Some(reference),
            None => self.parent.as_deref().and_then(Scope::self_reference),
        }
    }

    /// Looks `name` up among the block locals of this scope and its ancestors.
    pub fn local(&self, name: &str) -> Option<&Reference> {
        self.locals
            .iter()
            .rev()
            .find(|(local, _)| local.as_ref() == name)
            .map(|(_, reference)| reference)
            .or_else(|| self.parent.as_deref().and_then(|p| p.local(name)))
    }

    /// Resolves the first part of a path.
    ///
    /// `this` names self; block locals shadow self members; any other name is
    /// read as a member of self. Returns `None` only when nothing in the
    /// chain can answer.
    pub fn get_base_reference(&self, name: &str) -> Option<Reference> {
        if name == "this" {
            return self.self_reference().cloned();
        }
        if let Some(local) = self.local(name) {
            return Some(local.clone());
        }
        self.self_reference().map(|self_ref| self_ref.get(name))
    }

    pub fn host_options(&self) -> &Value {
        &self.host_options
    }

    pub fn local_count(&self) -> usize {
        self.locals.len()
    }
}

fn bind_locals(names: &[Rc<str>], arguments: Vec<Reference>) -> Vec<(Rc<str>, Reference)> {
    let mut arguments = arguments.into_iter();
    names
        .iter()
        .map(|name| {
            let value = arguments
                .next()
                .unwrap_or_else(|| Reference::constant(Value::Null));
            (Rc::clone(name), value)
        })
        .collect()
}
