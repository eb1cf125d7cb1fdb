//! Field-by-field editing of a card configuration.

use card_core::{AuthenticationType, SourceType};
use serde_json::{Map, Value};
use tracing::debug;

/// Editable copy of a raw card configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardEditor {
    config: Map<String, Value>,
}

impl CardEditor {
    /// Start editing `config`. Anything but a JSON object starts from empty.
    pub fn new(config: &Value) -> Self {
        Self {
            config: config.as_object().cloned().unwrap_or_default(),
        }
    }

    pub fn config(&self) -> Value {
        Value::Object(self.config.clone())
    }

    pub fn title(&self) -> &str {
        self.text_field("title")
    }

    pub fn source(&self) -> Option<SourceType> {
        self.config.get("source")?.as_str()?.parse().ok()
    }

    pub fn text(&self) -> &str {
        self.text_field("text")
    }

    pub fn auth_type(&self) -> Option<AuthenticationType> {
        self.config.get("auth_type")?.as_str()?.parse().ok()
    }

    pub fn ssid(&self) -> &str {
        self.text_field("ssid")
    }

    pub fn password(&self) -> &str {
        self.text_field("password")
    }

    pub fn is_hidden(&self) -> bool {
        self.config
            .get("is_hidden")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Entity id of the `entity` field, whether written as a string or a reference.
    pub fn entity(&self) -> &str {
        match self.config.get("entity") {
            Some(Value::String(entity)) => entity,
            Some(Value::Object(reference)) => reference
                .get("entity")
                .and_then(Value::as_str)
                .unwrap_or(""),
            _ => "",
        }
    }

    /// Keys the form shows for the current source, in display order.
    pub fn visible_fields(&self) -> Vec<&'static str> {
        let mut fields = vec!["title", "source"];
        match self.source() {
            Some(SourceType::Text) => fields.push("text"),
            Some(SourceType::WiFi) => {
                fields.extend(["auth_type", "ssid"]);
                if self.auth_type().is_some_and(|auth| auth.is_password_protected()) {
                    fields.push("password");
                }
                fields.push("is_hidden");
            }
            Some(SourceType::Entity) => fields.push("entity"),
            None => {}
        }
        fields
    }

    /// Apply one form change. An empty `key` removes the field named by
    /// `value`. Returns the new configuration to announce, or `None` if the
    /// field already shows `value`.
    pub fn update(&mut self, key: &str, value: Value) -> Option<Value> {
        if self.current(key) == value {
            return None;
        }

        if key.is_empty() {
            let removed = value.as_str().and_then(|name| self.config.remove(name));
            debug!(field = ?value, removed = removed.is_some(), "Removed card field");
        } else {
            debug!(field = key, "Updated card field");
            self.config.insert(key.to_string(), value);
        }
        Some(self.config())
    }

    /// Value of `key` as the form displays it.
    fn current(&self, key: &str) -> Value {
        match key {
            "title" | "text" | "ssid" | "password" => Value::from(self.text_field(key)),
            "entity" => Value::from(self.entity()),
            "is_hidden" => Value::from(self.is_hidden()),
            "" => Value::Null,
            other => self.config.get(other).cloned().unwrap_or(Value::Null),
        }
    }

    fn text_field(&self, key: &str) -> &str {
        self.config.get(key).and_then(Value::as_str).unwrap_or("")
    }
}
