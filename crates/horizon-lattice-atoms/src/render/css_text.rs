//! CSS text serialization: declarations and selectors.

use crate::rules::PLACEHOLDER;
use crate::types::{StyleBlock, StyleValue};

/// Convert a camelCase property name to CSS form.
///
/// `WebkitTransition` becomes `-webkit-transition`, `msFlex` becomes
/// `-ms-flex`. Custom properties (`--name`) are kept as written.
pub fn hyphenate_property(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }
    let mut name = String::with_capacity(property.len() + 4);
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    if name.starts_with("ms-") {
        name.insert(0, '-');
    }
    name
}

/// Format a number without a trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Avoids "-0".
        return "0".to_string();
    }
    value.to_string()
}

/// Serialize declarations as `property:value;` pairs.
///
/// List values repeat the property once per item, so later values act as
/// fallbacks for earlier ones.
pub fn declarations_to_string(block: &StyleBlock) -> String {
    let mut css = String::new();
    for (property, value) in block.iter() {
        let name = hyphenate_property(property);
        match value {
            StyleValue::List(items) => {
                for item in items {
                    push_declaration(&mut css, &name, item);
                }
            }
            value => push_declaration(&mut css, &name, value),
        }
    }
    css
}

fn push_declaration(css: &mut String, name: &str, value: &StyleValue) {
    let value = match value {
        StyleValue::Str(s) => s.clone(),
        StyleValue::Number(n) => format_number(*n),
        _ => return,
    };
    css.push_str(name);
    css.push(':');
    css.push_str(&value);
    css.push(';');
}

/// Selector matching any prefix of `class_names`.
///
/// For `["a", "b"]` and `&:hover`, gives `.a:hover,.a.b:hover`: elements
/// rendered before an override carry only the shorter prefix and must still
/// match.
pub fn escalated_selector(selector: &str, class_names: &[String]) -> String {
    let mut compound = String::new();
    let mut selectors = Vec::with_capacity(class_names.len());
    for class_name in class_names {
        compound.push('.');
        compound.push_str(class_name);
        selectors.push(selector.replace(PLACEHOLDER, &compound));
    }
    selectors.join(",")
}
