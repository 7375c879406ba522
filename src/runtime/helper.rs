use std::{fmt, rc::Rc};

use crate::{
    diagnostics::HelperError,
    runtime::value::Value,
    surface::{ElementId, OutputSurface, SurfaceError},
};

/// Evaluated inputs handed to helpers, block helpers and modifiers.
#[derive(Debug, Clone, Copy)]
pub struct HelperArgs<'a> {
    pub params: &'a [Value],
    pub hash: &'a [(Rc<str>, Value)],
    pub host_options: &'a Value,
}

impl HelperArgs<'_> {
    /// Positional parameter, `Null` when absent.
    pub fn param(&self, index: usize) -> Value {
        self.params.get(index).cloned().unwrap_or(Value::Null)
    }

    pub fn hash_value(&self, name: &str) -> Option<&Value> {
        self.hash
            .iter()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, value)| value)
    }
}

pub type SimpleHelperFn = dyn Fn(&HelperArgs<'_>) -> Result<Value, HelperError>;
pub type BlockHelperFn = dyn Fn(&HelperArgs<'_>, &mut Blocks) -> Result<(), HelperError>;
pub type ModifierFn = dyn Fn(&mut ModifierContext<'_>, &HelperArgs<'_>) -> Result<(), HelperError>;

/// An entry of the helper table.
#[derive(Clone)]
pub enum Helper {
    /// Computes a value from its inputs. Usable in inline and expression position.
    Simple(Rc<SimpleHelperFn>),
    /// Chooses which child templates to render. Usable in block and component position.
    Block(Rc<BlockHelperFn>),
    /// Reads a variable from the dynamic scope (`-get-dynamic-var`).
    DynamicVar,
}

impl Helper {
    pub fn simple<F>(f: F) -> Self
    where
        F: Fn(&HelperArgs<'_>) -> Result<Value, HelperError> + 'static,
    {
        Helper::Simple(Rc::new(f))
    }

    pub fn block<F>(f: F) -> Self
    where
        F: Fn(&HelperArgs<'_>, &mut Blocks) -> Result<(), HelperError> + 'static,
    {
        Helper::Block(Rc::new(f))
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Helper::Block(_))
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Helper::Simple(_) => f.write_str("Helper::Simple"),
            Helper::Block(_) => f.write_str("Helper::Block"),
            Helper::DynamicVar => f.write_str("Helper::DynamicVar"),
        }
    }
}

/// Which child template of a block statement a yield renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Default,
    Inverse,
}

/// One request from a block helper to render a child template.
#[derive(Debug, Clone, PartialEq)]
pub struct Yield {
    pub block: BlockKind,
    pub args: Vec<Value>,
    pub dynamic_vars: Vec<(Rc<str>, Value)>,
}

/// Collects the yields of one block helper invocation, in order.
///
/// Yielding to a block the statement does not have renders nothing.
#[derive(Debug)]
pub struct Blocks {
    has_default: bool,
    has_inverse: bool,
    yields: Vec<Yield>,
}

impl Blocks {
    pub(crate) fn new(has_default: bool, has_inverse: bool) -> Self {
        Self {
            has_default,
            has_inverse,
            yields: Vec::new(),
        }
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }

    pub fn has_inverse(&self) -> bool {
        self.has_inverse
    }

    pub fn yield_default(&mut self, args: Vec<Value>) {
        self.push(BlockKind::Default, args, Vec::new());
    }

    pub fn yield_inverse(&mut self, args: Vec<Value>) {
        self.push(BlockKind::Inverse, args, Vec::new());
    }

    /// Yields `block` with `vars` bound in the dynamic scope of its content.
    pub fn yield_with_dynamic_vars(
        &mut self,
        block: BlockKind,
        args: Vec<Value>,
        vars: Vec<(Rc<str>, Value)>,
    ) {
        self.push(block, args, vars);
    }

    fn push(&mut self, block: BlockKind, args: Vec<Value>, dynamic_vars: Vec<(Rc<str>, Value)>) {
        let present = match block {
            BlockKind::Default => self.has_default,
            BlockKind::Inverse => self.has_inverse,
        };
        if present {
            self.yields.push(Yield {
                block,
                args,
                dynamic_vars,
            });
        }
    }

    pub(crate) fn into_yields(self) -> Vec<Yield> {
        self.yields
    }
}

/// An entry of the modifier table.
#[derive(Clone)]
pub struct Modifier(pub(crate) Rc<ModifierFn>);

impl Modifier {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut ModifierContext<'_>, &HelperArgs<'_>) -> Result<(), HelperError> + 'static,
    {
        Modifier(Rc::new(f))
    }
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Modifier")
    }
}

/// Access to the element a modifier is attached to.
pub struct ModifierContext<'a> {
    element: ElementId,
    installing: bool,
    surface: &'a mut dyn OutputSurface,
}

impl<'a> ModifierContext<'a> {
    pub(crate) fn new(
        element: ElementId,
        installing: bool,
        surface: &'a mut dyn OutputSurface,
    ) -> Self {
        Self {
            element,
            installing,
            surface,
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    /// `true` on the first run, `false` when re-run after an input change.
    pub fn is_installing(&self) -> bool {
        self.installing
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), SurfaceError> {
        self.surface.set_attribute(self.element, name, value)
    }

    pub fn remove_attribute(&mut self, name: &str) -> Result<(), SurfaceError> {
        self.surface.remove_attribute(self.element, name, None)
    }

    pub fn set_property(&mut self, name: &str, value: &Value) -> Result<(), SurfaceError> {
        self.surface.set_property(self.element, name, value)
    }
}
