//! Vendor prefixing.
//!
//! Prefixed duplicates are inserted right before the standard property, so the
//! standard declaration wins wherever it is supported.

use super::Plugin;
use crate::rules::RuleModifier;
use crate::types::{StyleBlock, StyleValue};
use crate::Result;

const WEBKIT: &str = "Webkit";
const MOZ: &str = "Moz";
const MS: &str = "ms";

/// Properties that need vendor-prefixed duplicates, with their prefixes.
const PREFIXED_PROPERTIES: &[(&str, &[&str])] = &[
    ("animation", &[WEBKIT]),
    ("animationDelay", &[WEBKIT]),
    ("animationDirection", &[WEBKIT]),
    ("animationDuration", &[WEBKIT]),
    ("animationFillMode", &[WEBKIT]),
    ("animationIterationCount", &[WEBKIT]),
    ("animationName", &[WEBKIT]),
    ("animationPlayState", &[WEBKIT]),
    ("animationTimingFunction", &[WEBKIT]),
    ("appearance", &[WEBKIT, MOZ]),
    ("backfaceVisibility", &[WEBKIT]),
    ("backgroundClip", &[WEBKIT]),
    ("boxDecorationBreak", &[WEBKIT]),
    ("boxSizing", &[WEBKIT, MOZ]),
    ("columnCount", &[WEBKIT, MOZ]),
    ("columnGap", &[WEBKIT, MOZ]),
    ("columnRule", &[WEBKIT, MOZ]),
    ("columnWidth", &[WEBKIT, MOZ]),
    ("columns", &[WEBKIT, MOZ]),
    ("filter", &[WEBKIT]),
    ("flex", &[WEBKIT, MS]),
    ("flexBasis", &[WEBKIT]),
    ("flexDirection", &[WEBKIT, MS]),
    ("flexFlow", &[WEBKIT, MS]),
    ("flexGrow", &[WEBKIT]),
    ("flexShrink", &[WEBKIT]),
    ("flexWrap", &[WEBKIT, MS]),
    ("alignContent", &[WEBKIT]),
    ("alignItems", &[WEBKIT]),
    ("alignSelf", &[WEBKIT]),
    ("justifyContent", &[WEBKIT]),
    ("order", &[WEBKIT]),
    ("hyphens", &[WEBKIT, MOZ, MS]),
    ("maskImage", &[WEBKIT]),
    ("perspective", &[WEBKIT]),
    ("perspectiveOrigin", &[WEBKIT]),
    ("textSizeAdjust", &[WEBKIT, MS]),
    ("transform", &[WEBKIT, MS]),
    ("transformOrigin", &[WEBKIT, MS]),
    ("transformStyle", &[WEBKIT]),
    ("transition", &[WEBKIT]),
    ("transitionDelay", &[WEBKIT]),
    ("transitionDuration", &[WEBKIT]),
    ("transitionProperty", &[WEBKIT]),
    ("transitionTimingFunction", &[WEBKIT]),
    ("userSelect", &[WEBKIT, MOZ, MS]),
];

/// Values that need vendor-specific fallbacks, keyed by property and value.
const VALUE_FALLBACKS: &[(&str, &str, &[&str])] = &[
    (
        "display",
        "flex",
        &["-webkit-box", "-moz-box", "-ms-flexbox", "-webkit-flex", "flex"],
    ),
    (
        "display",
        "inline-flex",
        &[
            "-webkit-inline-box",
            "-moz-inline-box",
            "-ms-inline-flexbox",
            "-webkit-inline-flex",
            "inline-flex",
        ],
    ),
    ("position", "sticky", &["-webkit-sticky", "sticky"]),
];

/// Adds vendor-prefixed duplicates of declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixerPlugin;

impl Plugin for PrefixerPlugin {
    fn apply(&self, _modifier: &mut dyn RuleModifier, block: &mut StyleBlock) -> Result<()> {
        let mut duplicates = Vec::new();
        for (property, value) in block.iter() {
            if !value.is_declaration() {
                continue;
            }
            let Some((_, prefixes)) = PREFIXED_PROPERTIES.iter().find(|(p, _)| *p == property)
            else {
                continue;
            };
            for prefix in prefixes.iter() {
                duplicates.push((
                    property.to_string(),
                    prefixed_property(prefix, property),
                    value.clone(),
                ));
            }
        }
        for (anchor, prefixed, value) in duplicates {
            block.insert_before(&anchor, prefixed, value);
        }

        for (property, value) in block.values_mut() {
            let StyleValue::Str(current) = value else {
                continue;
            };
            let fallback = VALUE_FALLBACKS
                .iter()
                .find(|(p, v, _)| *p == property && *v == current.as_str());
            if let Some((_, _, values)) = fallback {
                *value = StyleValue::from(values.to_vec());
            }
        }
        Ok(())
    }
}

fn prefixed_property(prefix: &str, property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => format!("{prefix}{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => prefix.to_string(),
    }
}
