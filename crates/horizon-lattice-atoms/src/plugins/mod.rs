//! Declaration block transforms.
//!
//! Every block the [`RuleBuilder`](crate::rules::RuleBuilder) visits (the
//! root block and every nested one) is passed through the registered plugins
//! in order. A plugin may rewrite declarations in place, and may call the
//! [`RuleModifier`] to open nested definitions or declare dependencies.
//!
//! The built-in transforms are ordinary pipeline entries:
//!
//! - [`ExtendsPlugin`]: `extends` key to rule dependencies
//! - [`NestingPlugin`]: `&`-keyed blocks to nested selector definitions
//! - [`MediaQueryPlugin`]: `@media` keyed blocks to media definitions
//! - [`PrefixerPlugin`]: vendor-prefixed duplicates
//! - [`DefaultUnitPlugin`]: units for bare numbers

mod default_unit;
mod extends;
mod media_query;
mod nesting;
mod prefixer;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::rules::RuleModifier;
use crate::types::StyleBlock;
use crate::Result;

pub use default_unit::{DefaultUnitOptions, DefaultUnitPlugin, is_unitless};
pub use extends::{EXTENDS_KEY, ExtendsPlugin};
pub use media_query::{MEDIA_MARKER, MediaQueryPlugin};
pub use nesting::NestingPlugin;
pub use prefixer::PrefixerPlugin;

/// A transform applied to every declaration block of a rule.
///
/// Closures with the matching signature are plugins too:
///
/// ```
/// use std::sync::Arc;
/// use horizon_lattice_atoms::prelude::*;
///
/// let uppercase = |_: &mut dyn RuleModifier, block: &mut StyleBlock| -> Result<()> {
///     if let Some(StyleValue::Str(value)) = block.get_mut("textTransform") {
///         *value = value.to_uppercase();
///     }
///     Ok(())
/// };
///
/// let pipeline = PluginPipeline::new();
/// assert!(pipeline.register(Arc::new(uppercase)));
/// ```
pub trait Plugin: Send + Sync {
    /// Transform `block`, registering children or dependencies through `modifier`.
    fn apply(&self, modifier: &mut dyn RuleModifier, block: &mut StyleBlock) -> Result<()>;
}

impl<F> Plugin for F
where
    F: Fn(&mut dyn RuleModifier, &mut StyleBlock) -> Result<()> + Send + Sync,
{
    fn apply(&self, modifier: &mut dyn RuleModifier, block: &mut StyleBlock) -> Result<()> {
        self(modifier, block)
    }
}

/// Ordered, append-only list of plugins.
///
/// Registering the same plugin instance twice is a no-op.
#[derive(Default)]
pub struct PluginPipeline {
    plugins: RwLock<Vec<Arc<dyn Plugin>>>,
}

impl PluginPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the standard pipeline with `px` as default unit.
    pub fn with_defaults() -> Self {
        Self::with_unit_options(DefaultUnitOptions::default())
    }

    /// Create the standard pipeline with custom default-unit options.
    ///
    /// Order: extends, nesting, media query, prefixer, default unit.
    ///
    /// Because nesting runs before media queries, definitions for `&` keys
    /// come before definitions for `@media` keys of the same block, whatever
    /// order the block lists them in.
    pub fn with_unit_options(options: DefaultUnitOptions) -> Self {
        let pipeline = Self::new();
        pipeline.register(Arc::new(ExtendsPlugin));
        pipeline.register(Arc::new(NestingPlugin));
        pipeline.register(Arc::new(MediaQueryPlugin));
        pipeline.register(Arc::new(PrefixerPlugin));
        pipeline.register(Arc::new(DefaultUnitPlugin::new(options)));
        pipeline
    }

    /// Append a plugin. Returns `false` if this instance is already registered.
    pub fn register(&self, plugin: Arc<dyn Plugin>) -> bool {
        let mut plugins = self.plugins.write();
        let registered = plugins
            .iter()
            .any(|existing| std::ptr::addr_eq(Arc::as_ptr(existing), Arc::as_ptr(&plugin)));
        if registered {
            return false;
        }
        plugins.push(plugin);
        true
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    /// Check if no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }

    /// Copy of the current plugin list, so building never holds the lock.
    pub fn snapshot(&self) -> Arc<[Arc<dyn Plugin>]> {
        self.plugins.read().iter().cloned().collect()
    }
}

impl fmt::Debug for PluginPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginPipeline")
            .field("len", &self.len())
            .finish()
    }
}
