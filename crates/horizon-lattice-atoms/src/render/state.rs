//! Serialized renderer state, handed from server to client.

use serde::{Deserialize, Serialize};

use super::RuleRendererState;
use crate::Result;

/// State of one rule renderer, keyed by rule id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleState {
    pub rule_id: String,
    pub renderer_state: RuleRendererState,
}

/// Everything needed to rebuild a [`StylesRenderer`](super::StylesRenderer)
/// over styles that are already present on the client.
///
/// The JSON form looks like:
///
/// ```json
/// {
///   "rules": [{ "ruleId": "button", "rendererState": { "index": 0, "classNames": ["a"] } }],
///   "identifierCounter": 1,
///   "checksum": "8c2a3f6e1d0b9a47"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylesRendererState {
    /// Rules in render order.
    pub rules: Vec<RuleState>,
    /// Identifier generator counter.
    pub identifier_counter: u32,
    /// Checksum of the rendered CSS text.
    pub checksum: String,
}

impl StylesRendererState {
    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
