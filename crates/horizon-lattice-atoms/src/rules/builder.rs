//! Expansion of style descriptions into rules.
//!
//! Blocks are expanded depth first. Before a block runs through the plugins,
//! its position in the definition list is reserved; nested definitions found
//! by the plugins are expanded completely, and only then is the block itself
//! inserted at the reserved position. The result lists every block before its
//! nested blocks, and those before any later sibling.

use std::sync::Arc;

use super::rule::{Definition, PLACEHOLDER, Rule};
use crate::plugins::Plugin;
use crate::types::StyleBlock;
use crate::{Error, Result};

/// Capabilities a plugin has while a rule is being built.
pub trait RuleModifier {
    /// Open a nested definition scoped by a selector fragment, a media query,
    /// or both, and expand `block` inside it.
    fn add_definition(
        &mut self,
        selector: Option<&str>,
        media: Option<&str>,
        block: StyleBlock,
    ) -> Result<()>;

    /// Declare that the rule depends on another rule.
    fn add_dependency(&mut self, rule_id: &str) -> Result<()>;
}

/// Access to other rules while building, used to validate dependencies.
pub trait RuleLookup {
    /// Get the rule registered under `rule_id`, building it if needed.
    fn lookup_rule(&self, rule_id: &str) -> Result<Option<Arc<Rule>>>;
}

/// Builds a single [`Rule`] from a style description.
pub struct RuleBuilder<'a> {
    rules: &'a dyn RuleLookup,
    plugins: Arc<[Arc<dyn Plugin>]>,
    definitions: Vec<Definition>,
    dependencies: Vec<String>,
    selector: String,
    media: Option<String>,
}

impl<'a> RuleBuilder<'a> {
    /// Create a builder running `plugins` on every block.
    pub fn new(rules: &'a dyn RuleLookup, plugins: Arc<[Arc<dyn Plugin>]>) -> Self {
        Self {
            rules,
            plugins,
            definitions: Vec::new(),
            dependencies: Vec::new(),
            selector: PLACEHOLDER.to_string(),
            media: None,
        }
    }

    /// Expand `block` into the rule `id`.
    pub fn build(mut self, id: impl Into<String>, block: StyleBlock) -> Result<Rule> {
        self.process(block, 0)?;
        Ok(Rule::new(id, self.definitions, self.dependencies))
    }

    fn process(&mut self, mut block: StyleBlock, index: usize) -> Result<()> {
        let plugins = Arc::clone(&self.plugins);
        for plugin in plugins.iter() {
            plugin.apply(self, &mut block)?;
        }

        if let Some((property, _)) = block.iter().find(|(_, value)| !value.is_declaration()) {
            return Err(Error::invalid_value(
                property,
                "nested block was not handled by any plugin",
            ));
        }

        if !block.is_empty() {
            let definition = Definition::new(self.selector.clone(), self.media.clone(), block);
            self.definitions.insert(index, definition);
        }
        Ok(())
    }

    fn is_top_level(&self) -> bool {
        self.selector == PLACEHOLDER && self.media.is_none()
    }
}

impl RuleModifier for RuleBuilder<'_> {
    fn add_definition(
        &mut self,
        selector: Option<&str>,
        media: Option<&str>,
        block: StyleBlock,
    ) -> Result<()> {
        let selector = selector.filter(|s| !s.is_empty());
        let media = media.filter(|m| !m.is_empty());
        if selector.is_none() && media.is_none() {
            return Err(Error::InvalidDefinition);
        }

        let composed = match selector {
            Some(fragment) => compose_selector(&self.selector, fragment)?,
            None => self.selector.clone(),
        };
        let media = match (media, &self.media) {
            (Some(media), Some(parent)) => {
                return Err(Error::NestedMedia {
                    media: media.to_string(),
                    parent: parent.clone(),
                });
            }
            (Some(media), None) => Some(media.to_string()),
            (None, current) => current.clone(),
        };

        let index = self.definitions.len();
        let parent_selector = std::mem::replace(&mut self.selector, composed);
        let parent_media = std::mem::replace(&mut self.media, media);
        let result = self.process(block, index);
        self.selector = parent_selector;
        self.media = parent_media;
        result
    }

    fn add_dependency(&mut self, rule_id: &str) -> Result<()> {
        if !self.is_top_level() {
            return Err(Error::NestedDependency {
                rule_id: rule_id.to_string(),
            });
        }
        if self.rules.lookup_rule(rule_id)?.is_none() {
            return Err(Error::UnknownDependency {
                rule_id: rule_id.to_string(),
            });
        }
        self.dependencies.push(rule_id.to_string());
        Ok(())
    }
}

/// Substitute `current` for the first placeholder in `fragment`.
///
/// Later placeholders are left for the class name at render time.
fn compose_selector(current: &str, fragment: &str) -> Result<String> {
    if !fragment.contains(PLACEHOLDER) {
        return Err(Error::invalid_selector(
            fragment,
            format!("nested selectors must contain '{PLACEHOLDER}'"),
        ));
    }
    Ok(fragment.replacen(PLACEHOLDER, current, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::PluginPipeline;

    struct KnownRules(Vec<&'static str>);

    impl RuleLookup for KnownRules {
        fn lookup_rule(&self, rule_id: &str) -> Result<Option<Arc<Rule>>> {
            let known = self.0.iter().any(|known| *known == rule_id);
            Ok(known.then(|| Arc::new(Rule::new(rule_id, Vec::new(), Vec::new()))))
        }
    }

    fn build(block: StyleBlock) -> Result<Rule> {
        let known = KnownRules(vec!["base", "other"]);
        RuleBuilder::new(&known, PluginPipeline::with_defaults().snapshot()).build("test", block)
    }

    fn layout(rule: &Rule) -> Vec<(&str, Option<&str>)> {
        rule.definitions
            .iter()
            .map(|d| (d.selector.as_str(), d.media.as_deref()))
            .collect()
    }

    #[test]
    fn root_then_nested_selector() {
        let rule = build(
            StyleBlock::new()
                .set("color", "red")
                .nest("&:hover", StyleBlock::new().set("color", "blue")),
        )
        .unwrap();

        assert_eq!(layout(&rule), [("&", None), ("&:hover", None)]);
        assert_eq!(
            rule.definitions[1].declarations.get("color").and_then(|v| v.as_str()),
            Some("blue")
        );
    }

    #[test]
    fn empty_parent_is_dropped() {
        let rule = build(
            StyleBlock::new().nest("&:hover", StyleBlock::new().set("color", "blue")),
        )
        .unwrap();

        assert_eq!(layout(&rule), [("&:hover", None)]);
    }

    #[test]
    fn empty_parent_keeps_its_context() {
        let rule = build(StyleBlock::new().nest(
            "@media print",
            StyleBlock::new().nest("&:hover", StyleBlock::new().set("color", "blue")),
        ))
        .unwrap();

        assert_eq!(layout(&rule), [("&:hover", Some("@media print"))]);
    }

    #[test]
    fn nested_selectors_compose() {
        let rule = build(StyleBlock::new().nest(
            "&:first-child",
            StyleBlock::new().nest("&:hover", StyleBlock::new().set("color", "red")),
        ))
        .unwrap();

        assert_eq!(layout(&rule), [("&:first-child:hover", None)]);
    }

    #[test]
    fn only_the_first_placeholder_is_substituted() {
        let rule = build(StyleBlock::new().nest(
            "&:hover",
            StyleBlock::new().nest("& + &", StyleBlock::new().set("margin", 0)),
        ))
        .unwrap();

        assert_eq!(layout(&rule), [("&:hover + &", None)]);
    }

    #[test]
    fn depth_first_ordering() {
        let rule = build(
            StyleBlock::new()
                .set("color", "red")
                .nest(
                    "&:hover",
                    StyleBlock::new()
                        .set("color", "blue")
                        .nest("&:active", StyleBlock::new().set("color", "green")),
                )
                .nest("&:focus", StyleBlock::new().set("color", "black")),
        )
        .unwrap();

        assert_eq!(
            layout(&rule),
            [
                ("&", None),
                ("&:hover", None),
                ("&:hover:active", None),
                ("&:focus", None),
            ]
        );
    }

    #[test]
    fn media_query_definitions() {
        let rule = build(
            StyleBlock::new().set("color", "red").nest(
                "@media print",
                StyleBlock::new()
                    .set("color", "black")
                    .nest("&:hover", StyleBlock::new().set("color", "gray")),
            ),
        )
        .unwrap();

        assert_eq!(
            layout(&rule),
            [
                ("&", None),
                ("&", Some("@media print")),
                ("&:hover", Some("@media print")),
            ]
        );
    }

    #[test]
    fn selectors_come_before_media_in_the_same_block() {
        let rule = build(
            StyleBlock::new()
                .nest("@media print", StyleBlock::new().set("color", "black"))
                .nest("&:hover", StyleBlock::new().set("color", "gray")),
        )
        .unwrap();

        assert_eq!(
            layout(&rule),
            [("&:hover", None), ("&", Some("@media print"))]
        );
    }

    #[test]
    fn media_inside_media_is_rejected() {
        let result = build(StyleBlock::new().nest(
            "@media print",
            StyleBlock::new().nest("@media screen", StyleBlock::new().set("color", "red")),
        ));

        assert!(matches!(result, Err(Error::NestedMedia { .. })));
    }

    #[test]
    fn dependencies_only_on_top_level() {
        let rule = build(StyleBlock::new().set("extends", vec!["base", "other"])).unwrap();
        assert_eq!(rule.dependencies, ["base", "other"]);
        assert!(rule.is_empty());

        let nested = build(
            StyleBlock::new().nest("&:hover", StyleBlock::new().set("extends", "base")),
        );
        assert!(matches!(nested, Err(Error::NestedDependency { .. })));
    }

    #[test]
    fn unknown_dependency() {
        let result = build(StyleBlock::new().set("extends", "missing"));
        assert!(matches!(result, Err(Error::UnknownDependency { rule_id }) if rule_id == "missing"));
    }

    #[test]
    fn definition_needs_selector_or_media() {
        let known = KnownRules(Vec::new());
        let mut builder = RuleBuilder::new(&known, PluginPipeline::new().snapshot());

        assert!(matches!(
            builder.add_definition(None, Some(""), StyleBlock::new()),
            Err(Error::InvalidDefinition)
        ));
        assert!(matches!(
            builder.add_definition(Some(":hover"), None, StyleBlock::new()),
            Err(Error::InvalidSelector { .. })
        ));
    }

    #[test]
    fn unhandled_nested_block_is_rejected() {
        let known = KnownRules(Vec::new());
        let result = RuleBuilder::new(&known, PluginPipeline::new().snapshot()).build(
            "test",
            StyleBlock::new().nest("&:hover", StyleBlock::new().set("color", "red")),
        );

        assert!(matches!(result, Err(Error::InvalidValue { property, .. }) if property == "&:hover"));
    }

    #[test]
    fn plugins_run_on_nested_blocks() {
        let rule = build(StyleBlock::new().nest(
            "&:hover",
            StyleBlock::new().set("width", 10),
        ))
        .unwrap();

        assert_eq!(
            rule.definitions[0].declarations.get("width").and_then(|v| v.as_str()),
            Some("10px")
        );
    }
}
