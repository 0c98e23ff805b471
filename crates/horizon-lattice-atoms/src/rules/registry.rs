//! Rule registration with lazy building.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::builder::{RuleBuilder, RuleLookup};
use super::rule::Rule;
use crate::plugins::PluginPipeline;
use crate::types::StyleBlock;
use crate::{Error, Result};

#[derive(Debug)]
enum RuleEntry {
    /// Registered, not built yet.
    Pending(StyleBlock),
    /// Currently being built; seeing it again means a dependency cycle.
    Building,
    Built(Arc<Rule>),
}

/// Store of registered rules.
///
/// Rules are built on first [`get`](Self::get), so a rule may extend rules
/// registered after it. A build that fails leaves the rule pending, and no
/// partially built rule is ever stored.
///
/// # Example
///
/// ```
/// use horizon_lattice_atoms::prelude::*;
///
/// let registry = RuleRegistry::with_default_plugins();
/// let id = registry
///     .register(Some("title"), StyleBlock::new().set("fontSize", 20))
///     .unwrap();
///
/// let rule = registry.get(&id).unwrap().unwrap();
/// assert_eq!(rule.definitions.len(), 1);
/// ```
#[derive(Debug)]
pub struct RuleRegistry {
    entries: Mutex<HashMap<String, RuleEntry>>,
    plugins: PluginPipeline,
}

impl RuleRegistry {
    /// Create an empty registry building rules with `plugins`.
    pub fn new(plugins: PluginPipeline) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            plugins,
        }
    }

    /// Create an empty registry with the standard plugins.
    pub fn with_default_plugins() -> Self {
        Self::new(PluginPipeline::with_defaults())
    }

    /// The plugin pipeline rules are built with.
    ///
    /// Plugins registered later only apply to rules built afterwards.
    pub fn plugins(&self) -> &PluginPipeline {
        &self.plugins
    }

    /// Register a style description.
    ///
    /// Without an id (or with an empty one), the id is derived from the
    /// content, so registering the same content twice yields the same id.
    pub fn register(&self, id: Option<&str>, style: StyleBlock) -> Result<String> {
        let explicit = id.filter(|id| !id.is_empty());
        let rule_id = match explicit {
            Some(id) => id.to_string(),
            None => style.content_id()?,
        };

        let mut entries = self.entries.lock();
        if entries.contains_key(&rule_id) {
            if explicit.is_some() {
                return Err(Error::DuplicateRule { rule_id });
            }
            return Ok(rule_id);
        }
        entries.insert(rule_id.clone(), RuleEntry::Pending(style));
        tracing::debug!("Registered rule '{}'", rule_id);
        Ok(rule_id)
    }

    /// Get a rule, building it (and its dependencies) on first access.
    pub fn get(&self, rule_id: &str) -> Result<Option<Arc<Rule>>> {
        let style = {
            let mut entries = self.entries.lock();
            let Some(entry) = entries.get_mut(rule_id) else {
                return Ok(None);
            };
            match std::mem::replace(entry, RuleEntry::Building) {
                RuleEntry::Pending(style) => style,
                RuleEntry::Built(rule) => {
                    *entry = RuleEntry::Built(Arc::clone(&rule));
                    return Ok(Some(rule));
                }
                RuleEntry::Building => {
                    return Err(Error::DependencyCycle {
                        rule_id: rule_id.to_string(),
                    });
                }
            }
        };

        // Building may look up other rules, so the lock is released meanwhile.
        let built = RuleBuilder::new(self, self.plugins.snapshot()).build(rule_id, style.clone());

        let mut entries = self.entries.lock();
        match built {
            Ok(rule) => {
                let rule = Arc::new(rule);
                entries.insert(rule_id.to_string(), RuleEntry::Built(Arc::clone(&rule)));
                tracing::debug!(
                    "Built rule '{}' with {} definitions",
                    rule_id,
                    rule.definitions.len()
                );
                Ok(Some(rule))
            }
            Err(err) => {
                entries.insert(rule_id.to_string(), RuleEntry::Pending(style));
                Err(err)
            }
        }
    }

    /// Check if a rule id is registered.
    pub fn contains(&self, rule_id: &str) -> bool {
        self.entries.lock().contains_key(rule_id)
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if no rule is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_default_plugins()
    }
}

impl RuleLookup for RuleRegistry {
    fn lookup_rule(&self, rule_id: &str) -> Result<Option<Arc<Rule>>> {
        self.get(rule_id)
    }
}
