//! Nested rule references.

use crate::{Error, Result};

/// An arbitrarily nested collection of rule ids.
///
/// Empty placeholders let callers pass conditional styles inline:
///
/// ```
/// use horizon_lattice_atoms::prelude::StyleRef;
///
/// let active = false;
/// let refs = StyleRef::from(vec![
///     StyleRef::from("button"),
///     StyleRef::from(active.then_some("button_active")),
///     StyleRef::from(["icon", ""]),
/// ]);
///
/// assert_eq!(refs.ids(), ["button", "icon"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StyleRef {
    /// Placeholder that contributes nothing.
    #[default]
    Empty,
    /// A rule id.
    Id(String),
    /// Nested references, in order.
    List(Vec<StyleRef>),
}

impl StyleRef {
    /// Flatten into the non-empty rule ids, in order, duplicates included.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids<'r>(&'r self, ids: &mut Vec<&'r str>) {
        match self {
            StyleRef::Empty => {}
            StyleRef::Id(id) => {
                if !id.is_empty() {
                    ids.push(id);
                }
            }
            StyleRef::List(items) => {
                for item in items {
                    item.collect_ids(ids);
                }
            }
        }
    }
}

impl From<&str> for StyleRef {
    fn from(id: &str) -> Self {
        if id.is_empty() {
            StyleRef::Empty
        } else {
            StyleRef::Id(id.to_string())
        }
    }
}

impl From<String> for StyleRef {
    fn from(id: String) -> Self {
        if id.is_empty() {
            StyleRef::Empty
        } else {
            StyleRef::Id(id)
        }
    }
}

impl From<&String> for StyleRef {
    fn from(id: &String) -> Self {
        StyleRef::from(id.as_str())
    }
}

impl<T: Into<StyleRef>> From<Option<T>> for StyleRef {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl<T: Into<StyleRef>> From<Vec<T>> for StyleRef {
    fn from(items: Vec<T>) -> Self {
        StyleRef::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<StyleRef>, const N: usize> From<[T; N]> for StyleRef {
    fn from(items: [T; N]) -> Self {
        StyleRef::List(items.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<&serde_json::Value> for StyleRef {
    type Error = Error;

    /// Convert host-provided references. `null`, `false`, `0` and `""` are
    /// empty placeholders; any other non-string scalar or an object is an
    /// error.
    fn try_from(value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match value {
            Value::Null | Value::Bool(false) => Ok(StyleRef::Empty),
            Value::Number(n) if n.as_f64().is_some_and(|n| n == 0.0) => Ok(StyleRef::Empty),
            Value::String(id) => Ok(StyleRef::from(id)),
            Value::Array(items) => items
                .iter()
                .map(StyleRef::try_from)
                .collect::<Result<Vec<_>>>()
                .map(StyleRef::List),
            other => Err(Error::InvalidReference(other.to_string())),
        }
    }
}
