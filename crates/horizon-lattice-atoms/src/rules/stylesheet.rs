//! Named collections of rules.

use std::ops::Index;

use super::RuleRegistry;
use crate::types::StyleBlock;
use crate::{Error, Result};

/// Maps style names to the ids of the rules registered for them.
///
/// # Example
///
/// ```
/// use horizon_lattice_atoms::prelude::*;
///
/// let registry = RuleRegistry::default();
/// let sheet = StyleSheet::create(
///     &registry,
///     Some("card"),
///     [
///         ("root", StyleBlock::new().set("padding", 8)),
///         ("title", StyleBlock::new().set("fontWeight", "bold")),
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(&sheet["title"], "card_title");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    rules: Vec<(String, String)>,
}

impl StyleSheet {
    /// Register a single rule, returning its id.
    pub fn create_rule(
        registry: &RuleRegistry,
        id: Option<&str>,
        style: StyleBlock,
    ) -> Result<String> {
        registry.register(id, style)
    }

    /// Register one rule per named style.
    ///
    /// With a sheet id, rule ids are `{sheet_id}_{name}`; otherwise they are
    /// derived from the content.
    pub fn create<K, I>(registry: &RuleRegistry, sheet_id: Option<&str>, styles: I) -> Result<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, StyleBlock)>,
    {
        let sheet_id = sheet_id.filter(|id| !id.is_empty());
        let mut rules = Vec::new();
        for (name, style) in styles {
            let name = name.into();
            if name.is_empty() {
                return Err(Error::invalid_value(
                    sheet_id.unwrap_or("<sheet>"),
                    "style names must not be empty",
                ));
            }
            let id = sheet_id.map(|sheet_id| format!("{sheet_id}_{name}"));
            let rule_id = registry.register(id.as_deref(), style)?;
            rules.push((name, rule_id));
        }
        Ok(Self { rules })
    }

    /// Register the named styles of a JSON object.
    pub fn from_json(registry: &RuleRegistry, sheet_id: Option<&str>, json: &str) -> Result<Self> {
        let styles: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let styles = styles
            .into_iter()
            .map(|(name, style)| Ok((name, StyleBlock::try_from(style)?)))
            .collect::<Result<Vec<_>>>()?;
        Self::create(registry, sheet_id, styles)
    }

    /// Get the rule id for a style name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| id.as_str())
    }

    /// Iterate over `(name, rule id)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules.iter().map(|(n, id)| (n.as_str(), id.as_str()))
    }

    /// Number of styles.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the sheet is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Rule id of the style called `name`.
///
/// # Panics
///
/// Panics if the sheet has no style called `name`. Use
/// [`StyleSheet::get`] to handle that case.
impl Index<&str> for StyleSheet {
    type Output = str;

    fn index(&self, name: &str) -> &str {
        match self.get(name) {
            Some(id) => id,
            None => panic!("no style named '{name}' in stylesheet"),
        }
    }
}
