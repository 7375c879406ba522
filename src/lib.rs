//! Incremental template rendering.
//!
//! A [`Template`] is built once from a statement specification. Rendering it
//! against an [`Environment`] and a `self` [`Model`] produces a live morph
//! tree bound to an [`OutputSurface`]; after the data changes, revalidating
//! the result re-applies only the output whose values actually moved.
//!
//! ```
//! use morphic::{Environment, MemorySurface, Model, RenderOptions, Template};
//! use serde_json::json;
//!
//! let template = Template::from_json(r#"[["text","Hello "],["unknown",["name"],false]]"#)?;
//! let data = Model::new(json!({ "name": "World" }));
//! let mut result = template.render(
//!     &Environment::new(),
//!     data.clone(),
//!     MemorySurface::new(),
//!     RenderOptions::default(),
//! )?;
//! assert_eq!(result.surface().to_html(), "Hello World");
//!
//! data.set_path("name", "Mars");
//! result.revalidate()?;
//! assert_eq!(result.surface().to_html(), "Hello Mars");
//! # Ok::<(), morphic::RenderError>(())
//! ```
pub mod diagnostics;
pub mod morph;
pub mod render;
pub mod runtime;
pub mod surface;
pub mod template;

pub use diagnostics::{LookupError, MorphResult, RenderError, SpecificationError};
pub use render::{RenderOptions, RenderResult, RevalidateStats, TopLevelRenderResult};
pub use runtime::{Environment, Helper, Model, Modifier, Value};
pub use surface::{MemorySurface, OutputSurface};
pub use template::{Template, TemplateBuilder, TemplateCache};
