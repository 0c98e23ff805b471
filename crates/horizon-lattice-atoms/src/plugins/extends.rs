//! Rule dependencies declared through the `extends` key.

use super::Plugin;
use crate::rules::RuleModifier;
use crate::types::{StyleBlock, StyleValue};
use crate::{Error, Result};

/// Reserved key holding dependency rule ids.
pub const EXTENDS_KEY: &str = "extends";

/// Turns `extends` into rule dependencies.
///
/// The value may be a rule id, a list of rule ids, or a [`RefProducer`]
/// evaluated at build time.
///
/// [`RefProducer`]: crate::types::RefProducer
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendsPlugin;

impl Plugin for ExtendsPlugin {
    fn apply(&self, modifier: &mut dyn RuleModifier, block: &mut StyleBlock) -> Result<()> {
        let Some(value) = block.remove(EXTENDS_KEY) else {
            return Ok(());
        };
        for rule_id in dependency_ids(value)? {
            modifier.add_dependency(&rule_id)?;
        }
        Ok(())
    }
}

fn dependency_ids(value: StyleValue) -> Result<Vec<String>> {
    match value {
        StyleValue::Str(rule_id) => Ok(vec![rule_id]),
        StyleValue::Refs(producer) => Ok(producer.produce()),
        StyleValue::List(items) => items
            .into_iter()
            .map(|item| match item {
                StyleValue::Str(rule_id) => Ok(rule_id),
                other => Err(Error::invalid_value(
                    EXTENDS_KEY,
                    format!("expected a rule id, got {other:?}"),
                )),
            })
            .collect(),
        other => Err(Error::invalid_value(
            EXTENDS_KEY,
            format!("expected a rule id or a list of rule ids, got {other:?}"),
        )),
    }
}
