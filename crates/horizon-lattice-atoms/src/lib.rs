//! Atomic style rules for Horizon Lattice.
//!
//! Style descriptions are registered once and rendered on demand into short
//! generated class names plus the CSS backing them:
//!
//! - **Rules**: style descriptions expanded into selector and media scoped
//!   definitions, built lazily on first use
//! - **Plugins**: nesting, media queries, `extends`, vendor prefixes and
//!   default units, all as ordinary pipeline entries
//! - **Resolution**: nested references flattened into dependency-ordered rules
//! - **Rendering**: class names, override escalation and CSS text, mirrored into
//!   a live style surface when one is attached
//! - **Hydration**: renderer state serialized on the server and adopted on the
//!   client without re-inserting styles
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_lattice_atoms::prelude::*;
//!
//! let registry = Arc::new(RuleRegistry::default());
//! let sheet = StyleSheet::create(
//!     &registry,
//!     Some("button"),
//!     [(
//!         "root",
//!         StyleBlock::new()
//!             .set("padding", 4)
//!             .nest("&:hover", StyleBlock::new().set("color", "blue")),
//!     )],
//! )?;
//!
//! let mut renderer = StylesRenderer::new(Arc::clone(&registry));
//! let class_names = renderer.render_styles(&sheet["root"])?;
//!
//! assert_eq!(class_names, "a");
//! assert_eq!(
//!     renderer.render_to_string(),
//!     ".a{padding:4px;}.a:hover{color:blue;}"
//! );
//! # Ok::<(), horizon_lattice_atoms::Error>(())
//! ```

pub mod checksum;
pub mod plugins;
pub mod render;
pub mod resolve;
pub mod rules;
pub mod surface;
pub mod types;

mod error;

pub use error::{Error, Result};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::plugins::{DefaultUnitOptions, Plugin, PluginPipeline};
    pub use crate::render::{
        AttachOutcome, IdentifierGenerator, RuleRenderer, SharedSurface, StylesRenderer,
        StylesRendererState,
    };
    pub use crate::resolve::{StyleRef, StyleResolver};
    pub use crate::rules::{Definition, Rule, RuleModifier, RuleRegistry, StyleSheet};
    pub use crate::surface::{MemorySurface, RuleHandle, StyleSurface};
    pub use crate::types::{RefProducer, StyleBlock, StyleValue};
    pub use crate::{Error, Result};
}
