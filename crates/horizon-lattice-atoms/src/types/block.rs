//! Insertion-ordered declaration blocks.

use serde::Deserialize;

use super::StyleValue;
use crate::checksum::ContentHasher;
use crate::{Error, Result};

/// A style description: an ordered mapping from property name to value.
///
/// Declaration order is significant in CSS, so entries keep the order they
/// were inserted in. Replacing an existing key keeps its position.
///
/// # Example
///
/// ```
/// use horizon_lattice_atoms::prelude::StyleBlock;
///
/// let block = StyleBlock::new()
///     .set("color", "red")
///     .nest("&:hover", StyleBlock::new().set("color", "blue"));
///
/// assert_eq!(block.len(), 2);
/// assert_eq!(block.keys().collect::<Vec<_>>(), ["color", "&:hover"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct StyleBlock {
    entries: Vec<(String, StyleValue)>,
}

impl StyleBlock {
    /// Create an empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn set(mut self, property: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.insert(property, value);
        self
    }

    /// Builder shortcut for a nested block.
    pub fn nest(self, key: impl Into<String>, block: StyleBlock) -> Self {
        self.set(key, StyleValue::Block(block))
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(
        &mut self,
        property: impl Into<String>,
        value: impl Into<StyleValue>,
    ) -> Option<StyleValue> {
        let property = property.into();
        let value = value.into();
        match self.position(&property) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.entries.push((property, value));
                None
            }
        }
    }

    /// Insert a value right before `anchor`, or at the end when `anchor` is
    /// absent. Does nothing if `property` is already present.
    pub fn insert_before(
        &mut self,
        anchor: &str,
        property: impl Into<String>,
        value: impl Into<StyleValue>,
    ) -> bool {
        let property = property.into();
        if self.contains_key(&property) {
            return false;
        }
        let index = self.position(anchor).unwrap_or(self.entries.len());
        self.entries.insert(index, (property, value.into()));
        true
    }

    /// Get a value.
    pub fn get(&self, property: &str) -> Option<&StyleValue> {
        self.position(property).map(|index| &self.entries[index].1)
    }

    /// Get a mutable value.
    pub fn get_mut(&mut self, property: &str) -> Option<&mut StyleValue> {
        let index = self.position(property)?;
        Some(&mut self.entries[index].1)
    }

    /// Remove a value, keeping the order of the remaining entries.
    pub fn remove(&mut self, property: &str) -> Option<StyleValue> {
        self.position(property)
            .map(|index| self.entries.remove(index).1)
    }

    /// Remove and return every entry matching `predicate`, in order.
    pub fn extract(
        &mut self,
        mut predicate: impl FnMut(&str, &StyleValue) -> bool,
    ) -> Vec<(String, StyleValue)> {
        let mut extracted = Vec::new();
        let mut kept = Vec::with_capacity(self.entries.len());
        for (property, value) in self.entries.drain(..) {
            if predicate(&property, &value) {
                extracted.push((property, value));
            } else {
                kept.push((property, value));
            }
        }
        self.entries = kept;
        extracted
    }

    /// Check if a property is present.
    pub fn contains_key(&self, property: &str) -> bool {
        self.position(property).is_some()
    }

    /// Iterate over property names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate over entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over values mutably.
    pub fn values_mut(&mut self) -> impl Iterator<Item = (&str, &mut StyleValue)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the block is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Feed the block content into a hasher, failing on lazy references.
    pub(crate) fn fingerprint(&self, hasher: &mut ContentHasher) -> Result<()> {
        hasher.write_len(self.entries.len());
        for (property, value) in &self.entries {
            hasher.write_str(property);
            value.fingerprint(property, hasher)?;
        }
        Ok(())
    }

    /// Content-derived id: identical content gives identical ids.
    pub fn content_id(&self) -> Result<String> {
        let mut hasher = ContentHasher::new();
        self.fingerprint(&mut hasher)?;
        Ok(format!("r{}", hasher.finish_hex()))
    }

    fn position(&self, property: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == property)
    }
}

impl TryFrom<serde_json::Value> for StyleBlock {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => {
                let mut block = StyleBlock::new();
                for (property, value) in map {
                    let value = StyleValue::from_json(&property, value)?;
                    block.entries.push((property, value));
                }
                Ok(block)
            }
            other => Err(Error::invalid_value(
                "<block>",
                format!("expected a plain mapping, got {other}"),
            )),
        }
    }
}

impl<K: Into<String>, V: Into<StyleValue>> FromIterator<(K, V)> for StyleBlock {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut block = StyleBlock::new();
        for (property, value) in iter {
            block.insert(property, value);
        }
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_keeps_position_on_replace() {
        let mut block = StyleBlock::new().set("a", "1").set("b", "2");
        let previous = block.insert("a", "3");

        assert_eq!(previous, Some(StyleValue::from("1")));
        assert_eq!(block.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(block.get("a"), Some(&StyleValue::from("3")));
    }

    #[test]
    fn insert_before_anchor() {
        let mut block = StyleBlock::new().set("color", "red").set("transition", "all 1s");
        assert!(block.insert_before("transition", "WebkitTransition", "all 1s"));
        assert!(!block.insert_before("transition", "WebkitTransition", "none"));

        assert_eq!(
            block.keys().collect::<Vec<_>>(),
            ["color", "WebkitTransition", "transition"]
        );
    }

    #[test]
    fn extract_preserves_order() {
        let mut block = StyleBlock::new()
            .set("color", "red")
            .nest("@media print", StyleBlock::new())
            .set("margin", 0)
            .nest("@media screen", StyleBlock::new());

        let media = block.extract(|key, _| key.starts_with("@media"));

        assert_eq!(media.len(), 2);
        assert_eq!(media[0].0, "@media print");
        assert_eq!(media[1].0, "@media screen");
        assert_eq!(block.keys().collect::<Vec<_>>(), ["color", "margin"]);
    }

    #[test]
    fn content_id_is_stable() {
        let first = StyleBlock::new().set("color", "red").set("margin", 1);
        let second = StyleBlock::new().set("color", "red").set("margin", 1);
        let other = StyleBlock::new().set("margin", 1).set("color", "red");

        assert_eq!(first.content_id().unwrap(), second.content_id().unwrap());
        assert_ne!(first.content_id().unwrap(), other.content_id().unwrap());
        assert!(first.content_id().unwrap().starts_with('r'));
    }

    #[test]
    fn from_json_object() {
        let block = StyleBlock::try_from(json!({
            "color": "red",
            "&:hover": { "color": "blue" },
        }))
        .unwrap();

        assert_eq!(block.get("color"), Some(&StyleValue::from("red")));
        assert!(block.get("&:hover").and_then(StyleValue::as_block).is_some());
    }

    #[test]
    fn from_json_rejects_non_mapping() {
        assert!(matches!(
            StyleBlock::try_from(json!(["color"])),
            Err(Error::InvalidValue { .. })
        ));
        assert!(matches!(
            StyleBlock::try_from(json!({ "color": null })),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn deserialize_through_serde() {
        let block: StyleBlock = serde_json::from_str(r#"{"fontSize": 12}"#).unwrap();
        assert_eq!(block.get("fontSize"), Some(&StyleValue::Number(12.0)));

        let invalid: std::result::Result<StyleBlock, _> = serde_json::from_str("3");
        assert!(invalid.is_err());
    }
}
