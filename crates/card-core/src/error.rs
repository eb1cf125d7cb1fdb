//! Error codes produced before rendering.
//!
//! Both tiers carry a namespaced code (for example `validation.ssid.missing`)
//! plus named interpolation arguments. Codes are only turned into display text
//! by a [`Translator`](crate::localize::Translator).

use std::fmt;

use serde::Serialize;

use crate::config::Field;

/// Code for a generic failure carrying the underlying message as `{message}`.
pub const GENERATION_ERROR: &str = "generation.error";
/// Code for a failure with nothing more specific to say.
pub const GENERATION_UNKNOWN_ERROR: &str = "generation.unknown_error";
/// Code used when the host hands over no configuration at all.
pub const INVALID_CONFIGURATION: &str = "common.invalid_configuration";

/// A localizable message: a lookup key plus ordered named arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translatable {
    pub key: String,
    pub args: Vec<(String, String)>,
}

impl Translatable {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push((name.into(), value.into()));
        self
    }

    /// Value of a named argument, if present.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for Translatable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// A pre-flight configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(Translatable);

impl ValidationError {
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self(Translatable::new(key))
    }

    pub(crate) fn field(field: impl fmt::Display, problem: &str) -> Self {
        Self::new(format!("validation.{field}.{problem}"))
    }

    pub fn code(&self) -> &str {
        &self.0.key
    }

    pub fn message(&self) -> &Translatable {
        &self.0
    }
}

/// Failure while resolving field values or assembling the input string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("source is not a recognized type")]
    InvalidSource,

    #[error("{field} is missing")]
    Missing { field: Field },

    #[error("{field} refers to unknown entity {entity_id}")]
    UnknownEntity { field: Field, entity_id: String },

    #[error("{field} refers to attribute {attribute} not present on {entity_id}")]
    UnknownAttribute {
        field: Field,
        entity_id: String,
        attribute: String,
    },

    #[error("{field} refers to {entity_id}, which is unavailable")]
    Unavailable { field: Field, entity_id: String },

    #[error("{field} has unsupported type {type_name}")]
    UnknownType {
        field: Field,
        type_name: &'static str,
    },

    #[error("generation failed: {0}")]
    Generation(String),
}

impl BuildError {
    /// Namespaced code for this failure.
    pub fn code(&self) -> String {
        match self {
            Self::InvalidSource => "validation.source.invalid".to_string(),
            Self::Missing { field } => format!("validation.{field}.missing"),
            Self::UnknownEntity { field, .. } => format!("validation.{field}.unknown_entity"),
            Self::UnknownAttribute { field, .. } => {
                format!("validation.{field}.unknown_attribute")
            }
            Self::Unavailable { field, .. } => format!("validation.{field}.unavailable"),
            Self::UnknownType { field, .. } => format!("validation.{field}.unknown_type"),
            Self::Generation(_) => GENERATION_ERROR.to_string(),
        }
    }

    pub fn to_translatable(&self) -> Translatable {
        let message = Translatable::new(self.code());
        match self {
            Self::InvalidSource | Self::Missing { .. } => message,
            Self::UnknownEntity { entity_id, .. } | Self::Unavailable { entity_id, .. } => {
                message.with_arg("entity", entity_id.as_str())
            }
            Self::UnknownAttribute { attribute, .. } => {
                message.with_arg("attribute", attribute.as_str())
            }
            Self::UnknownType { type_name, .. } => message.with_arg("type", *type_name),
            Self::Generation(reason) => message.with_arg("message", reason.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_error_codes_are_namespaced_by_field() {
        let err = BuildError::UnknownEntity {
            field: Field::Ssid,
            entity_id: "sensor.ssid".into(),
        };
        assert_eq!(err.code(), "validation.ssid.unknown_entity");
        assert_eq!(err.to_translatable().arg("entity"), Some("sensor.ssid"));
    }

    #[test]
    fn unknown_attribute_carries_attribute_name() {
        let err = BuildError::UnknownAttribute {
            field: Field::Entity,
            entity_id: "sensor.temp".into(),
            attribute: "unit".into(),
        };
        let message = err.to_translatable();
        assert_eq!(message.key, "validation.entity.unknown_attribute");
        assert_eq!(message.args, vec![("attribute".to_string(), "unit".to_string())]);
    }

    #[test]
    fn generation_error_keeps_underlying_message() {
        let err = BuildError::Generation("boom".into());
        let message = err.to_translatable();
        assert_eq!(message.key, GENERATION_ERROR);
        assert_eq!(message.arg("message"), Some("boom"));
    }

    #[test]
    fn validation_error_displays_its_code() {
        let err = ValidationError::field("auth_type", "invalid");
        assert_eq!(err.code(), "validation.auth_type.invalid");
        assert_eq!(err.to_string(), "validation.auth_type.invalid");
    }
}
