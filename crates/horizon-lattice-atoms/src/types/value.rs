//! Declaration value types.
//!
//! A style description is a tree: leaves are strings and numbers, lists hold
//! repeated values for one property, nested blocks carry selector or media
//! scoped declarations, and [`RefProducer`] defers rule references until the
//! rule is built.
//!
//! # Example
//!
//! ```
//! use horizon_lattice_atoms::prelude::StyleValue;
//!
//! let color = StyleValue::from("red");
//! assert_eq!(color.as_str(), Some("red"));
//!
//! let size = StyleValue::from(12);
//! assert_eq!(size.as_number(), Some(12.0));
//! ```

use std::fmt;
use std::sync::Arc;

use super::StyleBlock;
use crate::checksum::ContentHasher;
use crate::{Error, Result};

/// A value inside a [`StyleBlock`].
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    /// A literal declaration value.
    Str(String),
    /// A number, possibly completed with a unit by the default-unit plugin.
    Number(f64),
    /// Several values for one property, rendered as repeated declarations.
    List(Vec<StyleValue>),
    /// A nested declaration block (selector or media scoped).
    Block(StyleBlock),
    /// Lazily produced rule ids (used by `extends`).
    Refs(RefProducer),
}

impl StyleValue {
    /// Get the string value, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric value, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the nested block, if any.
    pub fn as_block(&self) -> Option<&StyleBlock> {
        match self {
            StyleValue::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Whether this value can be rendered as a declaration.
    ///
    /// Strings, numbers and lists of those are declarations; blocks and
    /// producers must be consumed by a plugin before the block is committed.
    pub fn is_declaration(&self) -> bool {
        match self {
            StyleValue::Str(_) | StyleValue::Number(_) => true,
            StyleValue::List(items) => items.iter().all(StyleValue::is_declaration),
            StyleValue::Block(_) | StyleValue::Refs(_) => false,
        }
    }

    /// Feed the value into a content hasher.
    pub(crate) fn fingerprint(&self, property: &str, hasher: &mut ContentHasher) -> Result<()> {
        match self {
            StyleValue::Str(s) => {
                hasher.write_tag(b's');
                hasher.write_str(s);
            }
            StyleValue::Number(n) => {
                hasher.write_tag(b'n');
                hasher.write_f64(*n);
            }
            StyleValue::List(items) => {
                hasher.write_tag(b'l');
                hasher.write_len(items.len());
                for item in items {
                    item.fingerprint(property, hasher)?;
                }
            }
            StyleValue::Block(block) => {
                hasher.write_tag(b'b');
                block.fingerprint(hasher)?;
            }
            StyleValue::Refs(_) => {
                return Err(Error::invalid_value(
                    property,
                    "lazily produced references require an explicit rule id",
                ));
            }
        }
        Ok(())
    }

    /// Convert a JSON value, validating its shape.
    pub(crate) fn from_json(property: &str, value: serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match value {
            Value::String(s) => Ok(StyleValue::Str(s)),
            Value::Number(n) => n
                .as_f64()
                .map(StyleValue::Number)
                .ok_or_else(|| Error::invalid_value(property, format!("number {n} is out of range"))),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(_) | Value::Number(_) => StyleValue::from_json(property, item),
                    other => Err(Error::invalid_value(
                        property,
                        format!("list items must be strings or numbers, got {other}"),
                    )),
                })
                .collect::<Result<Vec<_>>>()
                .map(StyleValue::List),
            Value::Object(_) => StyleBlock::try_from(value).map(StyleValue::Block),
            Value::Null | Value::Bool(_) => Err(Error::invalid_value(
                property,
                format!("expected a string, number, list or block, got {value}"),
            )),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Str(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Str(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Number(f64::from(value))
    }
}

impl From<u32> for StyleValue {
    fn from(value: u32) -> Self {
        StyleValue::Number(f64::from(value))
    }
}

impl From<StyleBlock> for StyleValue {
    fn from(value: StyleBlock) -> Self {
        StyleValue::Block(value)
    }
}

impl From<RefProducer> for StyleValue {
    fn from(value: RefProducer) -> Self {
        StyleValue::Refs(value)
    }
}

impl<T: Into<StyleValue>> From<Vec<T>> for StyleValue {
    fn from(values: Vec<T>) -> Self {
        StyleValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// A deferred list of rule ids.
///
/// Lets a rule extend rules that are registered later in the same sheet.
#[derive(Clone)]
pub struct RefProducer(Arc<dyn Fn() -> Vec<String> + Send + Sync>);

impl RefProducer {
    /// Wrap a producer closure.
    pub fn new(producer: impl Fn() -> Vec<String> + Send + Sync + 'static) -> Self {
        Self(Arc::new(producer))
    }

    /// Evaluate the producer.
    pub fn produce(&self) -> Vec<String> {
        (self.0)()
    }
}

impl fmt::Debug for RefProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefProducer(..)")
    }
}

impl PartialEq for RefProducer {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}
