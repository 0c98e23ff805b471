//! Rendering of style references into class names and CSS.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::{IdentifierGenerator, RuleRenderer, RuleState, StylesRendererState};
use crate::checksum::checksum;
use crate::resolve::{StyleRef, StyleResolver};
use crate::rules::RuleRegistry;
use crate::surface::StyleSurface;
use crate::{Error, Result};

/// A live surface shared between the host and a renderer.
pub type SharedSurface = Arc<Mutex<dyn StyleSurface + Send>>;

/// How [`StylesRenderer::attach`] brought the surface in line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Every rule was inserted.
    Attached,
    /// Existing entries matched the restored state and were adopted.
    Hydrated,
    /// Existing entries did not match; the surface was cleared and refilled.
    Reattached,
    /// The renderer already had a surface; nothing was done.
    AlreadyAttached,
}

/// Turns style references into class names, keeping the CSS for every rule
/// seen so far.
///
/// Each distinct rule gets a fixed position in the render order the first
/// time it is rendered. When a later call asks for an earlier rule to win over
/// a later one, positions cannot change, so the winning rule's override level
/// is raised instead: it gets an extra class name and a more specific
/// selector.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_lattice_atoms::prelude::*;
///
/// let registry = Arc::new(RuleRegistry::default());
/// registry.register(Some("red"), StyleBlock::new().set("color", "red")).unwrap();
/// registry.register(Some("blue"), StyleBlock::new().set("color", "blue")).unwrap();
///
/// let mut renderer = StylesRenderer::new(Arc::clone(&registry));
/// assert_eq!(renderer.render_styles(["red", "blue"]).unwrap(), "a b");
/// assert_eq!(renderer.render_styles(["blue", "red"]).unwrap(), "b a c");
/// assert_eq!(
///     renderer.render_to_string(),
///     ".a,.a.c{color:red;}.b{color:blue;}"
/// );
/// ```
pub struct StylesRenderer {
    registry: Arc<RuleRegistry>,
    generator: IdentifierGenerator,
    order: Vec<String>,
    renderers: HashMap<String, RuleRenderer>,
    surface: Option<SharedSurface>,
    restored: Option<Restored>,
    rendered: OnceCell<String>,
}

/// What a renderer built by [`StylesRenderer::from_state`] expects to find on
/// the first surface it is attached to.
#[derive(Debug)]
struct Restored {
    checksum: String,
    /// Class name count of each restored rule, in render order.
    class_counts: Vec<usize>,
}

impl StylesRenderer {
    /// Create an empty renderer.
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self {
            registry,
            generator: IdentifierGenerator::new(),
            order: Vec::new(),
            renderers: HashMap::new(),
            surface: None,
            restored: None,
            rendered: OnceCell::new(),
        }
    }

    /// Rebuild a renderer from serialized state, without resolving any
    /// references. The next [`attach`](Self::attach) adopts the existing
    /// entries if their content matches the state's checksum.
    ///
    /// Every generated class name in the state must come from below its
    /// identifier counter, so that no class name is handed out twice.
    pub fn from_state(registry: Arc<RuleRegistry>, state: StylesRendererState) -> Result<Self> {
        let counter = state.identifier_counter;
        let mut renderer = Self::new(registry);
        let mut class_counts = Vec::with_capacity(state.rules.len());
        for (position, RuleState { rule_id, renderer_state }) in state.rules.into_iter().enumerate() {
            if renderer_state.index != position {
                return Err(Error::invalid_state(format!(
                    "rule '{rule_id}' has index {} at position {position}",
                    renderer_state.index
                )));
            }
            if renderer.renderers.contains_key(&rule_id) {
                return Err(Error::invalid_state(format!("rule '{rule_id}' appears twice")));
            }
            let reused = renderer_state.class_names.iter().find(|name| {
                IdentifierGenerator::counter_of(name).is_some_and(|position| position >= counter)
            });
            if let Some(name) = reused {
                return Err(Error::invalid_state(format!(
                    "class name '{name}' of rule '{rule_id}' is not below identifier counter {counter}"
                )));
            }
            let rule = renderer
                .registry
                .get(&rule_id)?
                .ok_or_else(|| Error::invalid_state(format!("rule '{rule_id}' is not registered")))?;
            let rule_renderer =
                RuleRenderer::with_class_names(rule, position, renderer_state.class_names)?;
            class_counts.push(rule_renderer.class_names().len());
            renderer.order.push(rule_id.clone());
            renderer.renderers.insert(rule_id, rule_renderer);
        }
        renderer.generator = IdentifierGenerator::starting_at(counter);
        renderer.restored = Some(Restored {
            checksum: state.checksum,
            class_counts,
        });
        tracing::debug!("Restored renderer state with {} rules", renderer.order.len());
        Ok(renderer)
    }

    /// The registry rules are resolved from.
    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// Rule ids in render order.
    pub fn rule_ids(&self) -> &[String] {
        &self.order
    }

    /// Renderer of a rule that has been rendered.
    pub fn renderer(&self, rule_id: &str) -> Option<&RuleRenderer> {
        self.renderers.get(rule_id)
    }

    /// Resolve `refs` and return the space separated class names to put on
    /// an element.
    ///
    /// Rules seen for the first time are appended to the render order (and
    /// inserted into the surface, if attached). Rules requested out of their
    /// render order get their override level raised.
    pub fn render_styles(&mut self, refs: impl Into<StyleRef>) -> Result<String> {
        let rules = StyleResolver::new(&self.registry).resolve(&refs.into())?;

        let surface = self.surface.clone();
        let mut guard = surface.as_ref().map(|surface| surface.lock());

        let mut class_names = Vec::new();
        let mut override_level = 0;
        let mut max_index: Option<usize> = None;
        for rule in rules {
            let renderer = match self.renderers.entry(rule.id.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let index = self.order.len();
                    let renderer = RuleRenderer::new(rule, index, &mut self.generator)?;
                    tracing::debug!("Rendering rule '{}' at index {}", entry.key(), index);
                    self.order.push(entry.key().clone());
                    self.rendered.take();
                    entry.insert(renderer)
                }
            };

            let index = renderer.index();
            if max_index.is_some_and(|max| index < max) {
                override_level += 1;
            } else {
                max_index = Some(index);
            }

            if renderer.set_override_level(override_level, &mut self.generator, surface_mut(&mut guard))? {
                self.rendered.take();
            }
            if let Some(surface) = surface_mut(&mut guard) {
                renderer.attach(surface)?;
            }
            class_names.extend(renderer.class_names_for(override_level).iter().cloned());
        }
        Ok(class_names.join(" "))
    }

    /// Connect to a live surface.
    ///
    /// A renderer restored with [`from_state`](Self::from_state) adopts the
    /// existing entries when their checksum matches; otherwise the surface is
    /// cleared and every rule inserted again. Rules rendered after the restore
    /// are inserted, and selectors escalated since are rewritten. A fresh
    /// renderer clears any content it finds before inserting.
    pub fn attach(&mut self, surface: SharedSurface) -> Result<AttachOutcome> {
        if self.surface.is_some() {
            return Ok(AttachOutcome::AlreadyAttached);
        }

        let outcome = {
            let mut guard = surface.lock();
            match self.restored.take() {
                Some(restored) => {
                    let actual = checksum(&guard.text_content());
                    if actual != restored.checksum {
                        tracing::warn!(
                            "Style checksum mismatch (expected {}, found {}), re-inserting all rules",
                            restored.checksum,
                            actual
                        );
                        self.reattach(&mut *guard)?;
                        AttachOutcome::Reattached
                    } else if let Err(err) = self.hydrate(&mut *guard, &restored.class_counts) {
                        tracing::warn!("Failed to adopt existing styles ({}), re-inserting all rules", err);
                        self.reattach(&mut *guard)?;
                        AttachOutcome::Reattached
                    } else {
                        AttachOutcome::Hydrated
                    }
                }
                None => {
                    if guard.rule_count(None) > 0 {
                        tracing::warn!("Style surface is not empty, clearing it before attaching");
                        guard.clear();
                    }
                    self.attach_all(&mut *guard)?;
                    AttachOutcome::Attached
                }
            }
        };

        tracing::debug!("Attached styles renderer: {:?}", outcome);
        self.surface = Some(surface);
        Ok(outcome)
    }

    /// Disconnect from the live surface, returning it. Entries stay in place.
    pub fn detach(&mut self) -> Option<SharedSurface> {
        for renderer in self.renderers.values_mut() {
            renderer.detach();
        }
        self.surface.take()
    }

    /// The attached surface.
    pub fn surface(&self) -> Option<&SharedSurface> {
        self.surface.as_ref()
    }

    /// Concatenated CSS of every rule, in render order.
    pub fn render_to_string(&self) -> &str {
        self.rendered.get_or_init(|| {
            self.order
                .iter()
                .filter_map(|rule_id| self.renderers.get(rule_id))
                .map(RuleRenderer::render_to_string)
                .collect()
        })
    }

    /// State for [`from_state`](Self::from_state) on the other side.
    pub fn serialize(&self) -> StylesRendererState {
        StylesRendererState {
            rules: self
                .order
                .iter()
                .filter_map(|rule_id| {
                    let renderer = self.renderers.get(rule_id)?;
                    Some(RuleState {
                        rule_id: rule_id.clone(),
                        renderer_state: renderer.state(),
                    })
                })
                .collect(),
            identifier_counter: self.generator.current_count(),
            checksum: checksum(self.render_to_string()),
        }
    }

    fn attach_all(&mut self, surface: &mut dyn StyleSurface) -> Result<()> {
        for rule_id in &self.order {
            if let Some(renderer) = self.renderers.get_mut(rule_id) {
                renderer.attach(surface)?;
            }
        }
        Ok(())
    }

    /// Adopt the entries of the restored rules, then bring the surface up to
    /// date with whatever was rendered before attaching.
    fn hydrate(&mut self, surface: &mut dyn StyleSurface, class_counts: &[usize]) -> Result<()> {
        let (restored, rendered_since) = self
            .order
            .split_at_checked(class_counts.len())
            .ok_or_else(|| Error::invalid_state("render order is shorter than the restored state"))?;

        let mut position = 0;
        for rule_id in restored {
            if let Some(renderer) = self.renderers.get_mut(rule_id) {
                position = renderer.connect(surface, position)?;
            }
        }
        if position != surface.rule_count(None) {
            return Err(Error::surface(format!(
                "{} entries left over after adopting",
                surface.rule_count(None) - position
            )));
        }

        // The adopted entries carry the selectors of the restored class names.
        for (rule_id, &count) in restored.iter().zip(class_counts) {
            if let Some(renderer) = self.renderers.get(rule_id) {
                if renderer.class_names().len() != count {
                    renderer.refresh_selectors(surface)?;
                }
            }
        }
        for rule_id in rendered_since {
            if let Some(renderer) = self.renderers.get_mut(rule_id) {
                renderer.attach(surface)?;
            }
        }
        Ok(())
    }

    fn reattach(&mut self, surface: &mut dyn StyleSurface) -> Result<()> {
        for renderer in self.renderers.values_mut() {
            renderer.detach();
        }
        surface.clear();
        self.attach_all(surface)
    }
}

fn surface_mut<'g>(
    guard: &'g mut Option<MutexGuard<'_, dyn StyleSurface + Send>>,
) -> Option<&'g mut dyn StyleSurface> {
    match guard {
        Some(guard) => Some(&mut **guard),
        None => None,
    }
}

impl fmt::Debug for StylesRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StylesRenderer")
            .field("order", &self.order)
            .field("identifier_counter", &self.generator.current_count())
            .field("attached", &self.surface.is_some())
            .field("restored", &self.restored.is_some())
            .finish()
    }
}
