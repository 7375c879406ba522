use std::rc::Rc;

use tracing::debug;

use crate::runtime::{
    builtins,
    frame::{DynamicScope, Frame, HelperTable, ModifierTable},
    helper::{Helper, Modifier},
    model::Model,
    reference::Reference,
    scope::Scope,
    value::Value,
};

/// Helper and modifier tables shared by every render.
///
/// Tables are copy-on-write: registering after a render leaves the frames of
/// that render untouched, and only the next render sees the change.
#[derive(Debug, Clone)]
pub struct Environment {
    helpers: Rc<HelperTable>,
    modifiers: Rc<ModifierTable>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Creates an environment with the built-in helpers registered.
    pub fn new() -> Self {
        let mut env = Self::empty();
        builtins::register(&mut env);
        env
    }

    /// Creates an environment with no helpers at all.
    pub fn empty() -> Self {
        Self {
            helpers: Rc::new(HelperTable::new()),
            modifiers: Rc::new(ModifierTable::new()),
        }
    }

    pub fn register_helper(&mut self, name: &str, helper: Helper) {
        debug!(helper = name, block = helper.is_block(), "registering helper");
        Rc::make_mut(&mut self.helpers).insert(Rc::from(name), helper);
    }

    pub fn unregister_helper(&mut self, name: &str) -> Option<Helper> {
        Rc::make_mut(&mut self.helpers).remove(name)
    }

    pub fn has_helper(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    pub fn register_modifier(&mut self, name: &str, modifier: Modifier) {
        debug!(modifier = name, "registering modifier");
        Rc::make_mut(&mut self.modifiers).insert(Rc::from(name), modifier);
    }

    /// Builds the root scope of a top-level render.
    ///
    /// `locals` are the template's block parameter names, bound by position to
    /// `block_arguments`.
    pub fn create_root_scope(
        &self,
        self_model: Option<Model>,
        locals: &[Rc<str>],
        block_arguments: Vec<Reference>,
        host_options: Value,
    ) -> Rc<Scope> {
        let self_ref = self_model.map(Reference::root);
        Rc::new(Scope::root(self_ref, host_options).init_top_level(locals, block_arguments))
    }

    /// Pushes the root frame for `scope`.
    pub fn push_frame(&self, scope: Rc<Scope>, dynamic_vars: Vec<(Rc<str>, Reference)>) -> Frame {
        Frame::new(
            scope,
            Rc::new(DynamicScope::new(dynamic_vars)),
            Rc::clone(&self.helpers),
            Rc::clone(&self.modifiers),
        )
    }
}
