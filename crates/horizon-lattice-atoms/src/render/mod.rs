//! Class name assignment and CSS output.

mod css_text;
mod identifiers;
mod rule_renderer;
mod state;
mod styles_renderer;

pub use css_text::{declarations_to_string, escalated_selector, format_number, hyphenate_property};
pub use identifiers::IdentifierGenerator;
pub use rule_renderer::{RuleRenderer, RuleRendererState};
pub use state::{RuleState, StylesRendererState};
pub use styles_renderer::{AttachOutcome, SharedSurface, StylesRenderer};
