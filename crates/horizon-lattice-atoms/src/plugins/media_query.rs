//! Media query extraction.

use super::Plugin;
use crate::rules::RuleModifier;
use crate::types::{StyleBlock, StyleValue};
use crate::{Error, Result};

/// Prefix identifying media query keys.
pub const MEDIA_MARKER: &str = "@media";

/// Turns `@media ...` keyed blocks into media scoped definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaQueryPlugin;

impl Plugin for MediaQueryPlugin {
    fn apply(&self, modifier: &mut dyn RuleModifier, block: &mut StyleBlock) -> Result<()> {
        for (media, value) in block.extract(|key, _| key.starts_with(MEDIA_MARKER)) {
            let StyleValue::Block(nested) = value else {
                return Err(Error::invalid_value(media, "media query must map to a block"));
            };
            modifier.add_definition(None, Some(&media), nested)?;
        }
        Ok(())
    }
}
