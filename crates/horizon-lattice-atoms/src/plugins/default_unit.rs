//! Default unit appension for numeric values.

use std::collections::HashMap;

use serde::Deserialize;

use super::Plugin;
use crate::render::format_number;
use crate::rules::RuleModifier;
use crate::types::{StyleBlock, StyleValue};
use crate::Result;

/// Properties which accept numbers that are not lengths.
const UNITLESS_PROPERTIES: &[&str] = &[
    "animationIterationCount",
    "borderImageOutset",
    "borderImageSlice",
    "borderImageWidth",
    "boxFlex",
    "boxFlexGroup",
    "boxOrdinalGroup",
    "columnCount",
    "flex",
    "flexGrow",
    "flexPositive",
    "flexShrink",
    "flexNegative",
    "flexOrder",
    "gridRow",
    "gridColumn",
    "fontWeight",
    "lineClamp",
    "lineHeight",
    "opacity",
    "order",
    "orphans",
    "tabSize",
    "widows",
    "zIndex",
    "zoom",
    // SVG
    "fillOpacity",
    "floodOpacity",
    "stopOpacity",
    "strokeDasharray",
    "strokeDashoffset",
    "strokeMiterlimit",
    "strokeOpacity",
    "strokeWidth",
];

const VENDOR_PREFIXES: &[&str] = &["Webkit", "Moz", "ms", "O"];

/// Check whether a property takes bare numbers, including vendor-prefixed
/// forms such as `WebkitFlexGrow` or `msFlexGrow`.
pub fn is_unitless(property: &str) -> bool {
    if UNITLESS_PROPERTIES.contains(&property) {
        return true;
    }
    VENDOR_PREFIXES.iter().any(|prefix| {
        property
            .strip_prefix(prefix)
            .and_then(|rest| {
                let mut chars = rest.chars();
                let first = chars.next().filter(char::is_ascii_uppercase)?;
                Some(format!("{}{}", first.to_ascii_lowercase(), chars.as_str()))
            })
            .is_some_and(|unprefixed| UNITLESS_PROPERTIES.contains(&unprefixed.as_str()))
    })
}

/// Options for [`DefaultUnitPlugin`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DefaultUnitOptions {
    /// Unit appended to bare numbers.
    pub unit: String,
    /// Per-property unit overrides, keyed by property name.
    pub property_units: HashMap<String, String>,
}

impl Default for DefaultUnitOptions {
    fn default() -> Self {
        Self {
            unit: "px".to_string(),
            property_units: HashMap::new(),
        }
    }
}

impl DefaultUnitOptions {
    /// Options with a different default unit.
    pub fn with_unit(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            ..Default::default()
        }
    }

    /// Override the unit for a single property.
    pub fn property_unit(mut self, property: impl Into<String>, unit: impl Into<String>) -> Self {
        self.property_units.insert(property.into(), unit.into());
        self
    }

    /// Unit to use for `property`.
    pub fn unit_for(&self, property: &str) -> &str {
        self.property_units
            .get(property)
            .map(String::as_str)
            .unwrap_or(&self.unit)
    }
}

/// Appends a unit to numeric values of properties that require one.
#[derive(Debug, Clone, Default)]
pub struct DefaultUnitPlugin {
    options: DefaultUnitOptions,
}

impl DefaultUnitPlugin {
    /// Create the plugin.
    pub fn new(options: DefaultUnitOptions) -> Self {
        Self { options }
    }

    /// The configured options.
    pub fn options(&self) -> &DefaultUnitOptions {
        &self.options
    }
}

impl Plugin for DefaultUnitPlugin {
    fn apply(&self, _modifier: &mut dyn RuleModifier, block: &mut StyleBlock) -> Result<()> {
        for (property, value) in block.values_mut() {
            if is_unitless(property) {
                continue;
            }
            let unit = self.options.unit_for(property);
            if let StyleValue::List(items) = value {
                for item in items.iter_mut() {
                    append_unit(item, unit);
                }
            } else {
                append_unit(value, unit);
            }
        }
        Ok(())
    }
}

fn append_unit(value: &mut StyleValue, unit: &str) {
    if let StyleValue::Number(n) = value {
        *value = StyleValue::Str(format!("{}{unit}", format_number(*n)));
    }
}
