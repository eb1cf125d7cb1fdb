//! Pre-flight checks over a raw card configuration.

use serde_json::Value;
use tracing::debug;

use crate::config::{Field, present, reference_entity};
use crate::error::ValidationError;
use crate::features::Features;
use crate::source::{AuthenticationType, SourceType};

type VariantValidator = fn(&Value, &Features, &mut Vec<ValidationError>);

/// Validate a raw configuration. An empty result means the configuration can
/// be built.
///
/// Checks run in a fixed order: `source`, `debug`, then the fields of the
/// selected variant. Variant checks are skipped when `source` is unusable.
pub fn validate(raw: &Value, features: &Features) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let source = validate_source(raw, &mut errors);

    if raw
        .get("debug")
        .is_some_and(|debug| !debug.is_null() && !debug.is_boolean())
    {
        errors.push(ValidationError::field("debug", "invalid"));
    }

    if let Some(source) = source {
        variant_validator(source)(raw, features, &mut errors);
    }

    if !errors.is_empty() {
        debug!(
            count = errors.len(),
            first = errors[0].code(),
            "Card configuration rejected"
        );
    }
    errors
}

fn variant_validator(source: SourceType) -> VariantValidator {
    match source {
        SourceType::Text => validate_text,
        SourceType::WiFi => validate_wifi,
        SourceType::Entity => validate_entity,
    }
}

fn validate_source(raw: &Value, errors: &mut Vec<ValidationError>) -> Option<SourceType> {
    match raw.get("source") {
        None | Some(Value::Null) => {
            errors.push(ValidationError::field("source", "missing"));
            None
        }
        Some(Value::String(tag)) if tag.is_empty() => {
            errors.push(ValidationError::field("source", "missing"));
            None
        }
        Some(Value::String(tag)) => match tag.parse() {
            Ok(source) => Some(source),
            Err(_) => {
                errors.push(ValidationError::field("source", "invalid"));
                None
            }
        },
        Some(_) => {
            errors.push(ValidationError::field("source", "invalid"));
            None
        }
    }
}

fn validate_text(raw: &Value, _features: &Features, errors: &mut Vec<ValidationError>) {
    if is_blank(raw, Field::Text) {
        errors.push(ValidationError::field(Field::Text, "missing"));
    }
}

fn validate_wifi(raw: &Value, features: &Features, errors: &mut Vec<ValidationError>) {
    let auth_type = match raw.get("auth_type") {
        None | Some(Value::Null) => {
            errors.push(ValidationError::field("auth_type", "missing"));
            return;
        }
        Some(Value::String(tag)) if tag.is_empty() => {
            errors.push(ValidationError::field("auth_type", "missing"));
            return;
        }
        Some(Value::String(tag)) => match tag.parse::<AuthenticationType>() {
            Ok(auth_type) => auth_type,
            Err(_) => {
                errors.push(ValidationError::field("auth_type", "invalid"));
                return;
            }
        },
        Some(_) => {
            errors.push(ValidationError::field("auth_type", "invalid"));
            return;
        }
    };

    validate_wifi_field(raw, Field::Ssid, features, errors);
    if auth_type.is_password_protected() {
        validate_wifi_field(raw, Field::Password, features, errors);
    }
    if raw
        .get("is_hidden")
        .is_some_and(|hidden| !hidden.is_null() && !hidden.is_boolean())
    {
        errors.push(ValidationError::field("is_hidden", "invalid"));
    }
}

fn validate_wifi_field(
    raw: &Value,
    field: Field,
    features: &Features,
    errors: &mut Vec<ValidationError>,
) {
    if is_blank(raw, field) {
        errors.push(ValidationError::field(field, "missing"));
        return;
    }
    if let Some(Value::Object(reference)) = raw.get(field.as_str()) {
        if !features.wifi_entity_fields {
            errors.push(ValidationError::field(field, "entity.unsupported"));
        } else if reference_entity(reference).is_none() {
            errors.push(ValidationError::field(field, "entity.missing"));
        }
    }
}

fn validate_entity(raw: &Value, _features: &Features, errors: &mut Vec<ValidationError>) {
    if is_blank(raw, Field::Entity) {
        errors.push(ValidationError::field(Field::Entity, "missing"));
    }
}

/// Absent, `null` and `""` all count as not given.
fn is_blank(raw: &Value, field: Field) -> bool {
    let Some(map) = raw.as_object() else {
        return true;
    };
    match present(map, field.as_str()) {
        None => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn codes(raw: &Value) -> Vec<String> {
        codes_with(raw, &Features::default())
    }

    fn codes_with(raw: &Value, features: &Features) -> Vec<String> {
        validate(raw, features)
            .iter()
            .map(|e| e.code().to_string())
            .collect()
    }

    #[test]
    fn missing_source_is_reported_first() {
        assert_eq!(codes(&json!({})), vec!["validation.source.missing"]);
        assert_eq!(
            codes(&json!({"debug": "yes", "text": "hi"})),
            vec!["validation.source.missing", "validation.debug.invalid"]
        );
        assert_eq!(codes(&json!("text")), vec!["validation.source.missing"]);
    }

    #[test]
    fn unrecognized_source_skips_variant_checks() {
        assert_eq!(
            codes(&json!({"source": "url"})),
            vec!["validation.source.invalid"]
        );
        assert_eq!(
            codes(&json!({"source": 3})),
            vec!["validation.source.invalid"]
        );
    }

    #[test]
    fn debug_must_be_boolean() {
        assert!(codes(&json!({"source": "text", "text": "a", "debug": true})).is_empty());
        assert_eq!(
            codes(&json!({"source": "text", "text": "a", "debug": "true"})),
            vec!["validation.debug.invalid"]
        );
    }

    #[test]
    fn text_must_be_non_empty() {
        assert!(codes(&json!({"source": "text", "text": "hello"})).is_empty());
        assert_eq!(
            codes(&json!({"source": "text", "text": ""})),
            vec!["validation.text.missing"]
        );
        assert_eq!(
            codes(&json!({"source": "text"})),
            vec!["validation.text.missing"]
        );
    }

    #[test]
    fn entity_must_be_given() {
        assert!(codes(&json!({"source": "entity", "entity": "sensor.temp"})).is_empty());
        assert_eq!(
            codes(&json!({"source": "entity", "entity": null})),
            vec!["validation.entity.missing"]
        );
    }

    #[test]
    fn auth_type_errors_end_wifi_checks() {
        assert_eq!(
            codes(&json!({"source": "wifi"})),
            vec!["validation.auth_type.missing"]
        );
        assert_eq!(
            codes(&json!({"source": "wifi", "auth_type": "WPA3"})),
            vec!["validation.auth_type.invalid"]
        );
    }

    #[test]
    fn open_network_needs_no_password() {
        assert!(codes(&json!({"source": "wifi", "auth_type": "nopass", "ssid": "Cafe"})).is_empty());
    }

    #[test]
    fn protected_network_needs_password() {
        for auth_type in ["WEP", "WPA"] {
            assert_eq!(
                codes(&json!({"source": "wifi", "auth_type": auth_type, "ssid": "Home"})),
                vec!["validation.password.missing"]
            );
        }
    }

    #[test]
    fn wifi_field_errors_follow_field_order() {
        assert_eq!(
            codes(&json!({"source": "wifi", "auth_type": "WPA", "debug": 1})),
            vec![
                "validation.debug.invalid",
                "validation.ssid.missing",
                "validation.password.missing"
            ]
        );
    }

    #[test]
    fn is_hidden_must_be_boolean() {
        let hidden = |value: Value| {
            codes(&json!({"source": "wifi", "auth_type": "nopass", "ssid": "Cafe", "is_hidden": value}))
        };
        assert!(hidden(json!(true)).is_empty());
        assert!(hidden(Value::Null).is_empty());
        assert_eq!(hidden(json!("true")), vec!["validation.is_hidden.invalid"]);
        assert_eq!(
            codes(&json!({"source": "wifi", "auth_type": "WPA", "is_hidden": 1})),
            vec![
                "validation.ssid.missing",
                "validation.password.missing",
                "validation.is_hidden.invalid"
            ]
        );
    }

    #[test]
    fn wifi_references_must_name_an_entity() {
        let raw = json!({
            "source": "wifi",
            "auth_type": "WPA",
            "ssid": {"attribute": "name"},
            "password": {"entity": ""}
        });
        assert_eq!(
            codes(&raw),
            vec![
                "validation.ssid.entity.missing",
                "validation.password.entity.missing"
            ]
        );

        let raw = json!({
            "source": "wifi",
            "auth_type": "WPA",
            "ssid": {"entity": "input_text.ssid"},
            "password": {"entity": "input_text.psk"}
        });
        assert!(codes(&raw).is_empty());
    }

    #[test]
    fn wifi_references_can_be_disabled() {
        let raw = json!({
            "source": "wifi",
            "auth_type": "WEP",
            "ssid": {"entity": "input_text.ssid"},
            "password": "literal"
        });
        assert_eq!(
            codes_with(&raw, &Features::literal_wifi()),
            vec!["validation.ssid.entity.unsupported"]
        );
    }
}
