//! Style rules: building, registration and stylesheets.

mod builder;
mod registry;
mod rule;
mod stylesheet;

pub use builder::{RuleBuilder, RuleLookup, RuleModifier};
pub use registry::RuleRegistry;
pub use rule::{Definition, PLACEHOLDER, Rule};
pub use stylesheet::StyleSheet;
