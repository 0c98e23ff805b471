//! Live style surfaces.
//!
//! A surface is the host's mutable stylesheet (a CSSOM sheet in a browser).
//! Renderers insert one entry per definition and keep the returned handles to
//! rewrite selectors when a rule's override level grows. Media scoped
//! definitions live inside a media container entry, one level deep.

mod memory;

pub use memory::MemorySurface;

use crate::Result;

/// Opaque reference to an entry of a [`StyleSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleHandle(u64);

impl RuleHandle {
    /// Wrap a host-specific identifier.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The host-specific identifier.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A mutable, host-owned list of style entries.
///
/// `parent` is `None` for the top level and a media container handle for the
/// entries nested inside it.
pub trait StyleSurface {
    /// Insert a rule (`selector{declarations}` or `@media ...{}`) at `position`.
    fn insert_rule(
        &mut self,
        parent: Option<RuleHandle>,
        text: &str,
        position: usize,
    ) -> Result<RuleHandle>;

    /// Number of entries in `parent`.
    fn rule_count(&self, parent: Option<RuleHandle>) -> usize;

    /// Entry of `parent` at `position`.
    fn rule_at(&self, parent: Option<RuleHandle>, position: usize) -> Option<RuleHandle>;

    /// Replace the selector of a style entry.
    fn set_selector_text(&mut self, handle: RuleHandle, selector: &str) -> Result<()>;

    /// Serialized content, in the format produced by renderers.
    fn text_content(&self) -> String;

    /// Remove every entry.
    fn clear(&mut self);
}
