//! Built rule definitions.

use crate::types::StyleBlock;

/// Placeholder standing for the generated class selector.
pub const PLACEHOLDER: &str = "&";

/// One selector and media scoped declaration block of a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// Selector template, containing [`PLACEHOLDER`] where the class goes.
    pub selector: String,
    /// Media query wrapping the definition, if any.
    pub media: Option<String>,
    /// Declarations, containing only declaration values.
    pub declarations: StyleBlock,
}

impl Definition {
    /// Create a definition.
    pub fn new(selector: impl Into<String>, media: Option<String>, declarations: StyleBlock) -> Self {
        Self {
            selector: selector.into(),
            media,
            declarations,
        }
    }
}

/// A built style rule.
///
/// Each rule has:
/// - The id it was registered under
/// - Definitions in render order: a block precedes its nested blocks, which
///   precede later siblings
/// - Ids of rules that must be rendered before it
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Registered id.
    pub id: String,
    /// Expanded definitions.
    pub definitions: Vec<Definition>,
    /// Rules this rule extends.
    pub dependencies: Vec<String>,
}

impl Rule {
    /// Create a rule.
    pub fn new(id: impl Into<String>, definitions: Vec<Definition>, dependencies: Vec<String>) -> Self {
        Self {
            id: id.into(),
            definitions,
            dependencies,
        }
    }

    /// Check if the rule has nothing to render.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
