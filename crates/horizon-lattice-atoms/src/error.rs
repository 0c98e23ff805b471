//! Error types for the atomic styling system.

/// Result type alias for style operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, resolving or rendering rules.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rendered CSS text could not be loaded into a surface.
    #[error("CSS parse error at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        line: u32,
        column: u32,
    },

    /// Selector fragment cannot be composed.
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    /// Malformed declaration block or declaration value.
    #[error("Invalid value for property '{property}': {message}")]
    InvalidValue { property: String, message: String },

    /// A definition was added without selector and without media.
    #[error("Expected definition to have a selector or a media query")]
    InvalidDefinition,

    /// A media scope was opened inside another media scope.
    #[error("Media query '{media}' cannot be nested inside '{parent}'")]
    NestedMedia { media: String, parent: String },

    /// A dependency was declared from a nested selector or media scope.
    #[error("Dependency '{rule_id}' can only be declared on the top level of a rule")]
    NestedDependency { rule_id: String },

    /// A dependency does not name a registered rule.
    #[error("Dependency '{rule_id}' is not a registered rule")]
    UnknownDependency { rule_id: String },

    /// Building a rule required building itself.
    #[error("Rule '{rule_id}' depends on itself")]
    DependencyCycle { rule_id: String },

    /// Two rules were registered under the same explicit id.
    #[error("Two rules registered with the same id: '{rule_id}'")]
    DuplicateRule { rule_id: String },

    /// A style reference does not name a registered rule.
    #[error("No rule registered for '{rule_id}'")]
    UnknownRule { rule_id: String },

    /// A style reference is neither a rule id nor an empty placeholder.
    #[error("Invalid style reference: {0}")]
    InvalidReference(String),

    /// The class name generator ran out of identifiers.
    #[error("Class name space exhausted after {0} identifiers")]
    IdentifiersExhausted(u32),

    /// Serialized renderer state is inconsistent.
    #[error("Invalid renderer state: {0}")]
    InvalidState(String),

    /// The live style surface rejected an operation.
    #[error("Style surface error: {0}")]
    Surface(String),

    /// Renderer state could not be encoded or decoded.
    #[error("Failed to encode renderer state: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a selector error.
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create a value error.
    pub fn invalid_value(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            property: property.into(),
            message: message.into(),
        }
    }

    /// Create a state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create a surface error.
    pub fn surface(message: impl Into<String>) -> Self {
        Self::Surface(message.into())
    }
}
