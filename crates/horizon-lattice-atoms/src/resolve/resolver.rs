//! Dependency-ordered rule resolution.

use std::collections::HashSet;
use std::sync::Arc;

use super::StyleRef;
use crate::rules::{Rule, RuleRegistry};
use crate::{Error, Result};

/// Turns style references into the rules to render, in order.
///
/// Resolution:
/// 1. Flattens the references, dropping empty placeholders
/// 2. Removes duplicate ids, keeping the last occurrence so a repeated id
///    takes the position where it was last requested
/// 3. Emits every rule after its dependencies, each rule at most once
#[derive(Debug, Clone, Copy)]
pub struct StyleResolver<'a> {
    registry: &'a RuleRegistry,
}

impl<'a> StyleResolver<'a> {
    /// Create a resolver over a registry.
    pub fn new(registry: &'a RuleRegistry) -> Self {
        Self { registry }
    }

    /// Resolve `refs` into rules.
    pub fn resolve(&self, refs: &StyleRef) -> Result<Vec<Arc<Rule>>> {
        let ids = refs.ids();

        let mut seen = HashSet::new();
        let mut requested: Vec<&str> = ids.into_iter().rev().filter(|id| seen.insert(*id)).collect();
        requested.reverse();

        let mut visited = HashSet::new();
        let mut resolved = Vec::new();
        for rule_id in requested {
            self.visit(rule_id, &mut visited, &mut resolved)?;
        }
        Ok(resolved)
    }

    fn visit(
        &self,
        rule_id: &str,
        visited: &mut HashSet<String>,
        resolved: &mut Vec<Arc<Rule>>,
    ) -> Result<()> {
        if !visited.insert(rule_id.to_string()) {
            return Ok(());
        }
        let rule = self.registry.get(rule_id)?.ok_or_else(|| Error::UnknownRule {
            rule_id: rule_id.to_string(),
        })?;
        for dependency in &rule.dependencies {
            self.visit(dependency, visited, resolved)?;
        }
        resolved.push(rule);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StyleBlock;

    fn registry(rules: &[(&str, &[&str])]) -> RuleRegistry {
        let registry = RuleRegistry::default();
        for &(id, extends) in rules {
            let mut style = StyleBlock::new().set("content", format!("'{id}'"));
            if !extends.is_empty() {
                style.insert("extends", extends.to_vec());
            }
            registry.register(Some(id), style).unwrap();
        }
        registry
    }

    fn resolve(registry: &RuleRegistry, refs: impl Into<StyleRef>) -> Vec<String> {
        StyleResolver::new(registry)
            .resolve(&refs.into())
            .unwrap()
            .iter()
            .map(|rule| rule.id.clone())
            .collect()
    }

    #[test]
    fn dependencies_are_deduplicated() {
        let registry = registry(&[("a", &[]), ("b", &["a"])]);
        assert_eq!(resolve(&registry, ["a", "b", "a"]), ["a", "b"]);
    }

    #[test]
    fn dependencies_precede_dependents() {
        let registry = registry(&[("a", &[]), ("b", &[]), ("c", &["b"])]);
        assert_eq!(resolve(&registry, ["a", "c"]), ["a", "b", "c"]);
    }

    #[test]
    fn last_occurrence_wins() {
        let registry = registry(&[("1", &[]), ("2", &[]), ("3", &[])]);
        assert_eq!(resolve(&registry, ["1", "3", "2", "3"]), ["1", "2", "3"]);
    }

    #[test]
    fn shared_dependencies_appear_once() {
        let registry = registry(&[("base", &[]), ("x", &["base"]), ("y", &["base"])]);
        assert_eq!(resolve(&registry, ["x", "y"]), ["base", "x", "y"]);
    }

    #[test]
    fn nested_references_and_placeholders() {
        let registry = registry(&[("a", &[]), ("b", &[])]);
        let refs = StyleRef::from(vec![
            StyleRef::from(None::<&str>),
            StyleRef::from(vec!["a", ""]),
            StyleRef::from("b"),
        ]);
        assert_eq!(resolve(&registry, refs), ["a", "b"]);
        assert!(resolve(&registry, StyleRef::Empty).is_empty());
    }

    #[test]
    fn unknown_rule() {
        let registry = registry(&[]);
        let result = StyleResolver::new(&registry).resolve(&StyleRef::from("missing"));
        assert!(matches!(result, Err(Error::UnknownRule { rule_id }) if rule_id == "missing"));
    }
}
