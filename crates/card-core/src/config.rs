//! Typed card configuration.
//!
//! Hosts persist the configuration as loose structured data, so it arrives as a
//! [`serde_json::Value`]. [`validate`](crate::validate::validate) inspects that
//! raw value; [`CardConfig::from_raw`] turns a validated one into the typed model.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BuildError;
use crate::source::{AuthenticationType, SourceType};

/// Configuration fields that resolve to a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Text,
    Ssid,
    Password,
    Entity,
}

impl Field {
    /// Key of the field in the card configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Ssid => "ssid",
            Self::Password => "password",
            Self::Entity => "entity",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points a field at live entity state instead of a literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(rename = "entity", alias = "entity_id")]
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl EntityRef {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            attribute: None,
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

/// A configuration value: either literal text or a reference to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Literal(String),
    Reference(EntityRef),
}

impl FieldValue {
    /// Interpret a raw configuration value for `field`.
    pub fn from_raw(field: Field, value: &Value) -> Result<Self, BuildError> {
        match value {
            Value::String(text) => Ok(Self::Literal(text.clone())),
            Value::Object(map) => reference_from_map(map)
                .map(Self::Reference)
                .ok_or(BuildError::UnknownType {
                    field,
                    type_name: "object",
                }),
            other => Err(BuildError::UnknownType {
                field,
                type_name: json_type_name(other),
            }),
        }
    }

    /// Entity id for references, `None` for literals.
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Reference(reference) => Some(&reference.entity_id),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Literal(text.to_string())
    }
}

impl From<EntityRef> for FieldValue {
    fn from(reference: EntityRef) -> Self {
        Self::Reference(reference)
    }
}

/// Variant-specific part of a card configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Text {
        text: FieldValue,
    },
    WiFi {
        auth_type: AuthenticationType,
        ssid: FieldValue,
        password: Option<FieldValue>,
        is_hidden: bool,
    },
    Entity {
        entity: FieldValue,
    },
}

/// A complete, typed card configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardConfig {
    pub title: Option<String>,
    pub language: Option<String>,
    pub debug: bool,
    pub source: SourceConfig,
}

#[derive(Deserialize)]
struct CommonFields {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    debug: Option<bool>,
}

impl CardConfig {
    /// Convert a raw configuration into the typed model.
    ///
    /// Expects a configuration that passed validation; anything that still
    /// does not fit is reported as a [`BuildError`].
    pub fn from_raw(raw: &Value) -> Result<Self, BuildError> {
        let map = raw
            .as_object()
            .ok_or_else(|| BuildError::Generation("configuration must be a mapping".into()))?;

        let common =
            CommonFields::deserialize(raw).map_err(|e| BuildError::Generation(e.to_string()))?;

        let source = map
            .get("source")
            .and_then(Value::as_str)
            .and_then(|tag| tag.parse::<SourceType>().ok())
            .ok_or(BuildError::InvalidSource)?;

        let source = match source {
            SourceType::Text => SourceConfig::Text {
                text: required(map, Field::Text)?,
            },
            SourceType::WiFi => {
                let auth_type = auth_type(map)?;
                // Open networks carry no password, whatever the raw config says.
                let password = if auth_type.is_password_protected() {
                    optional(map, Field::Password)?
                } else {
                    None
                };
                SourceConfig::WiFi {
                    auth_type,
                    ssid: required(map, Field::Ssid)?,
                    password,
                    is_hidden: is_hidden(map)?,
                }
            }
            SourceType::Entity => SourceConfig::Entity {
                // A bare string names the entity whose state is shown.
                entity: match present(map, Field::Entity.as_str()) {
                    Some(Value::String(entity_id)) => {
                        FieldValue::Reference(EntityRef::new(entity_id.as_str()))
                    }
                    Some(value) => FieldValue::from_raw(Field::Entity, value)?,
                    None => return Err(BuildError::Missing { field: Field::Entity }),
                },
            },
        };

        Ok(Self {
            title: common.title,
            language: common.language,
            debug: common.debug.unwrap_or(false),
            source,
        })
    }

    pub fn source_type(&self) -> SourceType {
        match self.source {
            SourceConfig::Text { .. } => SourceType::Text,
            SourceConfig::WiFi { .. } => SourceType::WiFi,
            SourceConfig::Entity { .. } => SourceType::Entity,
        }
    }

    /// The configured value of `field`, if the active variant has it.
    pub fn field(&self, field: Field) -> Option<&FieldValue> {
        match (&self.source, field) {
            (SourceConfig::Text { text }, Field::Text) => Some(text),
            (SourceConfig::WiFi { ssid, .. }, Field::Ssid) => Some(ssid),
            (SourceConfig::WiFi { password, .. }, Field::Password) => password.as_ref(),
            (SourceConfig::Entity { entity }, Field::Entity) => Some(entity),
            _ => None,
        }
    }
}

/// Errors from reading host-persisted configuration text.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a YAML card configuration into a raw value.
pub fn raw_from_yaml(text: &str) -> Result<Value, ConfigError> {
    Ok(serde_yaml::from_str(text)?)
}

/// Parse a JSON card configuration into a raw value.
pub fn raw_from_json(text: &str) -> Result<Value, ConfigError> {
    Ok(serde_json::from_str(text)?)
}

/// JavaScript-style type name of a JSON value, as reported in errors.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Entity id key of a reference object, if it has a non-empty one.
pub(crate) fn reference_entity(map: &Map<String, Value>) -> Option<&str> {
    map.get("entity")
        .or_else(|| map.get("entity_id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// A key counts as present unless it is absent or `null`.
pub(crate) fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn reference_from_map(map: &Map<String, Value>) -> Option<EntityRef> {
    let entity_id = reference_entity(map)?;
    let attribute = match map.get("attribute") {
        None | Some(Value::Null) => None,
        Some(Value::String(attribute)) => Some(attribute.clone()),
        Some(_) => return None,
    };
    Some(EntityRef {
        entity_id: entity_id.to_string(),
        attribute,
    })
}

fn required(map: &Map<String, Value>, field: Field) -> Result<FieldValue, BuildError> {
    optional(map, field)?.ok_or(BuildError::Missing { field })
}

fn optional(map: &Map<String, Value>, field: Field) -> Result<Option<FieldValue>, BuildError> {
    present(map, field.as_str())
        .map(|value| FieldValue::from_raw(field, value))
        .transpose()
}

fn auth_type(map: &Map<String, Value>) -> Result<AuthenticationType, BuildError> {
    let tag = map
        .get("auth_type")
        .and_then(Value::as_str)
        .ok_or_else(|| BuildError::Generation("auth_type is missing".into()))?;
    tag.parse::<AuthenticationType>()
        .map_err(|e| BuildError::Generation(e.to_string()))
}

fn is_hidden(map: &Map<String, Value>) -> Result<bool, BuildError> {
    match present(map, "is_hidden") {
        None => Ok(false),
        Some(Value::Bool(hidden)) => Ok(*hidden),
        Some(other) => Err(BuildError::Generation(format!(
            "is_hidden must be a boolean, got {}",
            json_type_name(other)
        ))),
    }
}
