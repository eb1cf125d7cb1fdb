//! Resolution of configuration fields against live entity state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{CardConfig, EntityRef, Field, FieldValue};
use crate::error::BuildError;

/// State string the host reports for entities it cannot reach.
pub const UNAVAILABLE: &str = "unavailable";

/// Current state of one entity as published by the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityState {
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EntityState {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// Read-only view of the host's live entity states.
pub trait StateStore {
    fn get(&self, entity_id: &str) -> Option<&EntityState>;
}

impl StateStore for HashMap<String, EntityState> {
    fn get(&self, entity_id: &str) -> Option<&EntityState> {
        HashMap::get(self, entity_id)
    }
}

/// Owned snapshot of entity states, keyed by entity id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct States(HashMap<String, EntityState>);

impl States {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, entity_id: impl Into<String>, state: EntityState) -> Self {
        self.0.insert(entity_id.into(), state);
        self
    }

    pub fn insert(&mut self, entity_id: impl Into<String>, state: EntityState) {
        self.0.insert(entity_id.into(), state);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl StateStore for States {
    fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.0.get(entity_id)
    }
}

impl FromIterator<(String, EntityState)> for States {
    fn from_iter<I: IntoIterator<Item = (String, EntityState)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Resolve `field` of `config` to the string it currently stands for.
///
/// The store is read on every call; nothing is cached between calls.
pub fn resolve(
    store: &dyn StateStore,
    config: &CardConfig,
    field: Field,
) -> Result<String, BuildError> {
    let value = config.field(field).ok_or(BuildError::Missing { field })?;
    resolve_value(store, field, value)
}

/// Resolve a single field value. `field` only names the value in errors.
pub fn resolve_value(
    store: &dyn StateStore,
    field: Field,
    value: &FieldValue,
) -> Result<String, BuildError> {
    match value {
        FieldValue::Literal(text) => Ok(text.clone()),
        FieldValue::Reference(reference) => resolve_reference(store, field, reference),
    }
}

fn resolve_reference(
    store: &dyn StateStore,
    field: Field,
    reference: &EntityRef,
) -> Result<String, BuildError> {
    let entity = store
        .get(&reference.entity_id)
        .ok_or_else(|| BuildError::UnknownEntity {
            field,
            entity_id: reference.entity_id.clone(),
        })?;

    match &reference.attribute {
        Some(attribute) => entity
            .attributes
            .get(attribute)
            .and_then(stringify_attribute)
            .ok_or_else(|| BuildError::UnknownAttribute {
                field,
                entity_id: reference.entity_id.clone(),
                attribute: attribute.clone(),
            }),
        None if entity.state == UNAVAILABLE => Err(BuildError::Unavailable {
            field,
            entity_id: reference.entity_id.clone(),
        }),
        None => Ok(entity.state.clone()),
    }
}

/// Text form of an attribute value. `null` counts as absent.
fn stringify_attribute(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => Some(value.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| stringify_attribute(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
    }
}
