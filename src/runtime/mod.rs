//! Data, references and lexical environment used while rendering.
//!
//! # No-Cycle Invariant
//! References only point at data (`Model` cells and other references), never
//! at the morph tree. The `Rc` graph formed by references, scopes and frames is
//! therefore acyclic and is freed as soon as the morph holding it is dropped.
pub mod builtins;
pub mod environment;
pub mod frame;
pub mod helper;
pub mod model;
pub mod reference;
pub mod scope;
pub mod value;

pub use environment::Environment;
pub use frame::Frame;
pub use helper::{BlockKind, Blocks, Helper, HelperArgs, Modifier, ModifierContext};
pub use model::Model;
pub use reference::Reference;
pub use value::Value;

#[cfg(test)]
mod reference_test;
