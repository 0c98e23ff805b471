//! Rendering of a single rule.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::IdentifierGenerator;
use super::css_text::{declarations_to_string, escalated_selector};
use crate::rules::{Definition, Rule};
use crate::surface::{RuleHandle, StyleSurface};
use crate::{Error, Result};

/// Serializable part of a [`RuleRenderer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRendererState {
    /// Position in the render order.
    pub index: usize,
    /// Assigned class names, oldest first.
    pub class_names: Vec<String>,
}

/// Renders one rule under its assigned class names.
///
/// A renderer starts with one class name. Raising the override level appends
/// class names; existing ones are never removed or reordered, so markup
/// rendered earlier keeps matching.
#[derive(Debug, Clone)]
pub struct RuleRenderer {
    rule: Arc<Rule>,
    index: usize,
    class_names: Vec<String>,
    /// One entry per definition, while attached to a surface.
    handles: Option<Vec<RuleHandle>>,
}

impl RuleRenderer {
    /// Create a renderer with a freshly generated class name.
    pub fn new(rule: Arc<Rule>, index: usize, generator: &mut IdentifierGenerator) -> Result<Self> {
        let class_name = generator.next_identifier()?;
        Self::with_class_names(rule, index, vec![class_name])
    }

    /// Create a renderer with previously assigned class names.
    pub fn with_class_names(rule: Arc<Rule>, index: usize, class_names: Vec<String>) -> Result<Self> {
        if class_names.is_empty() || class_names.iter().any(String::is_empty) {
            return Err(Error::invalid_state(format!(
                "rule '{}' needs at least one non-empty class name",
                rule.id
            )));
        }
        Ok(Self {
            rule,
            index,
            class_names,
            handles: None,
        })
    }

    /// The rendered rule.
    pub fn rule(&self) -> &Arc<Rule> {
        &self.rule
    }

    /// Position in the render order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Every assigned class name.
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Number of class names beyond the first.
    pub fn override_level(&self) -> usize {
        self.class_names.len() - 1
    }

    /// Class names to put on an element for `level`.
    pub fn class_names_for(&self, level: usize) -> &[String] {
        &self.class_names[..=level.min(self.override_level())]
    }

    /// Check if the renderer mirrors its definitions into a surface.
    pub fn is_attached(&self) -> bool {
        self.handles.is_some()
    }

    /// Insert one entry per definition at the end of `surface`.
    ///
    /// Consecutive definitions with the same media share one media container.
    pub fn attach(&mut self, surface: &mut dyn StyleSurface) -> Result<()> {
        if self.handles.is_some() {
            return Ok(());
        }
        let mut handles = Vec::with_capacity(self.rule.definitions.len());
        let mut media: Option<&str> = None;
        let mut container = None;
        for definition in &self.rule.definitions {
            let definition_media = definition.media.as_deref();
            if definition_media != media {
                container = match definition_media {
                    Some(condition) => {
                        let position = surface.rule_count(None);
                        Some(surface.insert_rule(None, &format!("{condition}{{}}"), position)?)
                    }
                    None => None,
                };
                media = definition_media;
            }
            let position = surface.rule_count(container);
            handles.push(surface.insert_rule(container, &self.definition_text(definition), position)?);
        }
        tracing::debug!(
            "Attached rule '{}' with {} entries",
            self.rule.id,
            handles.len()
        );
        self.handles = Some(handles);
        Ok(())
    }

    /// Adopt entries already present in `surface` from `position` on,
    /// returning the position after the last adopted entry.
    pub fn connect(&mut self, surface: &dyn StyleSurface, mut position: usize) -> Result<usize> {
        let missing = |position: usize| {
            Error::surface(format!(
                "no entry at position {position} for rule '{}'",
                self.rule.id
            ))
        };
        let mut handles = Vec::with_capacity(self.rule.definitions.len());
        let mut media: Option<&str> = None;
        let mut container = None;
        let mut nested = 0;
        for definition in &self.rule.definitions {
            let definition_media = definition.media.as_deref();
            if definition_media != media {
                container = match definition_media {
                    Some(_) => {
                        let handle = surface.rule_at(None, position).ok_or_else(|| missing(position))?;
                        position += 1;
                        nested = 0;
                        Some(handle)
                    }
                    None => None,
                };
                media = definition_media;
            }
            let handle = match container {
                Some(_) => {
                    let handle = surface.rule_at(container, nested).ok_or_else(|| missing(nested))?;
                    nested += 1;
                    handle
                }
                None => {
                    let handle = surface.rule_at(None, position).ok_or_else(|| missing(position))?;
                    position += 1;
                    handle
                }
            };
            handles.push(handle);
        }
        self.handles = Some(handles);
        Ok(position)
    }

    /// Forget the surface entries.
    pub fn detach(&mut self) {
        self.handles = None;
    }

    /// Textual form: definitions in order, media runs wrapped in their query.
    pub fn render_to_string(&self) -> String {
        let mut css = String::new();
        let mut media: Option<&str> = None;
        for definition in &self.rule.definitions {
            let definition_media = definition.media.as_deref();
            if definition_media != media {
                if media.is_some() {
                    css.push('}');
                }
                if let Some(condition) = definition_media {
                    css.push_str(condition);
                    css.push('{');
                }
                media = definition_media;
            }
            css.push_str(&self.definition_text(definition));
        }
        if media.is_some() {
            css.push('}');
        }
        css
    }

    /// Raise the override level to `level`, drawing class names from
    /// `generator`. Never lowers it.
    ///
    /// Returns whether anything changed. When attached, `surface` must be the
    /// surface the renderer is attached to; its selectors are rewritten.
    pub fn set_override_level(
        &mut self,
        level: usize,
        generator: &mut IdentifierGenerator,
        surface: Option<&mut dyn StyleSurface>,
    ) -> Result<bool> {
        if level <= self.override_level() {
            return Ok(false);
        }
        while self.class_names.len() <= level {
            self.class_names.push(generator.next_identifier()?);
        }
        tracing::debug!(
            "Raised override level of rule '{}' to {}",
            self.rule.id,
            level
        );

        if let Some(surface) = surface {
            self.refresh_selectors(surface)?;
        }
        Ok(true)
    }

    /// Rewrite the selector of every attached entry for the current class
    /// names. Does nothing while unattached.
    pub fn refresh_selectors(&self, surface: &mut dyn StyleSurface) -> Result<()> {
        if let Some(handles) = &self.handles {
            for (definition, handle) in self.rule.definitions.iter().zip(handles) {
                let selector = escalated_selector(&definition.selector, &self.class_names);
                surface.set_selector_text(*handle, &selector)?;
            }
        }
        Ok(())
    }

    /// Serializable state.
    pub fn state(&self) -> RuleRendererState {
        RuleRendererState {
            index: self.index,
            class_names: self.class_names.clone(),
        }
    }

    fn definition_text(&self, definition: &Definition) -> String {
        format!(
            "{}{{{}}}",
            escalated_selector(&definition.selector, &self.class_names),
            declarations_to_string(&definition.declarations)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleRegistry;
    use crate::surface::MemorySurface;
    use crate::types::StyleBlock;

    fn button() -> Arc<Rule> {
        let registry = RuleRegistry::default();
        registry
            .register(
                Some("button"),
                StyleBlock::new()
                    .set("color", "red")
                    .nest("&:hover", StyleBlock::new().set("color", "blue"))
                    .nest(
                        "@media print",
                        StyleBlock::new()
                            .set("color", "black")
                            .nest("&:hover", StyleBlock::new().set("color", "gray")),
                    ),
            )
            .unwrap();
        registry.get("button").unwrap().unwrap()
    }

    #[test]
    fn render_to_string_groups_media() {
        let mut generator = IdentifierGenerator::new();
        let renderer = RuleRenderer::new(button(), 0, &mut generator).unwrap();

        assert_eq!(
            renderer.render_to_string(),
            ".a{color:red;}.a:hover{color:blue;}@media print{.a{color:black;}.a:hover{color:gray;}}"
        );
        assert_eq!(renderer.class_names_for(0), ["a"]);
    }

    #[test]
    fn attach_mirrors_string_form() {
        let mut generator = IdentifierGenerator::new();
        let mut renderer = RuleRenderer::new(button(), 0, &mut generator).unwrap();
        let mut surface = MemorySurface::new();

        renderer.attach(&mut surface).unwrap();
        renderer.attach(&mut surface).unwrap();

        assert!(renderer.is_attached());
        assert_eq!(surface.text_content(), renderer.render_to_string());
        assert_eq!(surface.insertions(), 5);
    }

    #[test]
    fn override_level_grows_class_names() {
        let mut generator = IdentifierGenerator::new();
        let mut renderer = RuleRenderer::new(button(), 0, &mut generator).unwrap();
        let mut surface = MemorySurface::new();
        renderer.attach(&mut surface).unwrap();

        assert!(renderer
            .set_override_level(1, &mut generator, Some(&mut surface))
            .unwrap());
        assert!(!renderer
            .set_override_level(1, &mut generator, Some(&mut surface))
            .unwrap());
        assert!(!renderer
            .set_override_level(0, &mut generator, Some(&mut surface))
            .unwrap());

        assert_eq!(renderer.override_level(), 1);
        assert_eq!(renderer.class_names(), ["a", "b"]);
        assert_eq!(renderer.class_names_for(0), ["a"]);
        assert_eq!(renderer.class_names_for(5), ["a", "b"]);
        assert!(renderer.render_to_string().starts_with(".a,.a.b{color:red;}.a:hover,.a.b:hover{"));
        assert_eq!(surface.text_content(), renderer.render_to_string());
    }

    #[test]
    fn connect_adopts_existing_entries() {
        let mut generator = IdentifierGenerator::new();
        let server = RuleRenderer::new(button(), 0, &mut generator).unwrap();
        let mut surface = MemorySurface::from_css(&server.render_to_string()).unwrap();

        let mut client = RuleRenderer::with_class_names(button(), 0, vec!["a".into()]).unwrap();
        let next = client.connect(&surface, 0).unwrap();

        assert_eq!(next, 3);
        assert!(client.is_attached());

        let mut generator = IdentifierGenerator::starting_at(1);
        client
            .set_override_level(1, &mut generator, Some(&mut surface))
            .unwrap();
        assert_eq!(surface.insertions(), 0);
        assert_eq!(surface.text_content(), client.render_to_string());
    }

    #[test]
    fn refresh_selectors_after_unattached_escalation() {
        let mut generator = IdentifierGenerator::new();
        let server = RuleRenderer::new(button(), 0, &mut generator).unwrap();
        let mut surface = MemorySurface::from_css(&server.render_to_string()).unwrap();

        let mut client = RuleRenderer::with_class_names(button(), 0, vec!["a".into()]).unwrap();
        client.set_override_level(1, &mut generator, None).unwrap();
        client.connect(&surface, 0).unwrap();
        assert_ne!(surface.text_content(), client.render_to_string());

        client.refresh_selectors(&mut surface).unwrap();
        assert_eq!(surface.text_content(), client.render_to_string());
        assert_eq!(surface.insertions(), 0);
    }

    #[test]
    fn connect_fails_on_missing_entries() {
        let surface = MemorySurface::from_css(".a{color:red;}").unwrap();
        let mut renderer = RuleRenderer::with_class_names(button(), 0, vec!["a".into()]).unwrap();

        assert!(matches!(
            renderer.connect(&surface, 0),
            Err(Error::Surface(_))
        ));
    }

    #[test]
    fn class_names_must_not_be_empty() {
        assert!(matches!(
            RuleRenderer::with_class_names(button(), 0, Vec::new()),
            Err(Error::InvalidState(_))
        ));
        assert!(RuleRenderer::with_class_names(button(), 0, vec![String::new()]).is_err());
    }

    #[test]
    fn state_snapshot() {
        let mut generator = IdentifierGenerator::starting_at(7);
        let renderer = RuleRenderer::new(button(), 4, &mut generator).unwrap();

        assert_eq!(
            renderer.state(),
            RuleRendererState {
                index: 4,
                class_names: vec!["h".to_string()],
            }
        );
    }
}
