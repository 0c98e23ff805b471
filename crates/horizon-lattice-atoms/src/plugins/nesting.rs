//! Nested selectors keyed by `&` fragments.

use super::Plugin;
use crate::rules::{PLACEHOLDER, RuleModifier};
use crate::types::{StyleBlock, StyleValue};
use crate::{Error, Result};

/// Turns blocks keyed by selector fragments such as `&:hover` or
/// `& > span` into nested definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestingPlugin;

impl Plugin for NestingPlugin {
    fn apply(&self, modifier: &mut dyn RuleModifier, block: &mut StyleBlock) -> Result<()> {
        for (selector, value) in block.extract(|key, _| key.contains(PLACEHOLDER)) {
            let StyleValue::Block(nested) = value else {
                return Err(Error::invalid_selector(
                    selector,
                    "nested selector must map to a block",
                ));
            };
            modifier.add_definition(Some(&selector), None, nested)?;
        }
        Ok(())
    }
}
