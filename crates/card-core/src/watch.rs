//! Which live entities a card depends on, and whether they changed.

use crate::config::{CardConfig, Field, SourceConfig};
use crate::features::Features;
use crate::resolve::{EntityState, StateStore};

/// Entity ids whose changes must trigger a rebuild of `config`.
pub fn watched_entities(config: &CardConfig, features: &Features) -> Vec<String> {
    let fields: &[Field] = match config.source {
        SourceConfig::Text { .. } => &[Field::Text],
        SourceConfig::WiFi { .. } if features.wifi_entity_fields => &[Field::Ssid, Field::Password],
        SourceConfig::WiFi { .. } => &[],
        SourceConfig::Entity { .. } => &[Field::Entity],
    };

    let mut entities: Vec<String> = Vec::new();
    for entity_id in fields
        .iter()
        .filter_map(|field| config.field(*field))
        .filter_map(|value| value.entity_id())
    {
        if !entities.iter().any(|seen| seen == entity_id) {
            entities.push(entity_id.to_string());
        }
    }
    entities
}

/// The last observed state of each watched entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    observed: Vec<(String, Option<EntityState>)>,
}

impl Snapshot {
    pub fn capture(entity_ids: &[String], store: &dyn StateStore) -> Self {
        Self {
            observed: entity_ids
                .iter()
                .map(|id| (id.clone(), store.get(id).cloned()))
                .collect(),
        }
    }

    /// Whether any watched entity now differs (state or attributes) from what
    /// was captured. Unwatched entities are never compared.
    pub fn differs(&self, store: &dyn StateStore) -> bool {
        self.observed
            .iter()
            .any(|(id, seen)| store.get(id) != seen.as_ref())
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        self.observed.iter().map(|(id, _)| id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }
}
