//! Construction of the string that gets encoded into the QR symbol.

use crate::config::{CardConfig, Field, SourceConfig};
use crate::error::BuildError;
use crate::resolve::{StateStore, resolve};
use crate::source::AuthenticationType;

/// Characters with meaning in the Wi-Fi payload grammar. `\` comes first.
const WIFI_SPECIAL_CHARS: [char; 5] = ['\\', ';', ',', '"', ':'];

/// Backslash-escape the Wi-Fi payload special characters in one pass.
pub fn escape_wifi(plain: &str) -> String {
    let mut escaped = String::with_capacity(plain.len() + 4);
    for c in plain.chars() {
        if WIFI_SPECIAL_CHARS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the input string for `config`, reading referenced entities from `store`.
///
/// Either the complete string is returned or nothing is.
pub fn build(store: &dyn StateStore, config: &CardConfig) -> Result<String, BuildError> {
    match &config.source {
        SourceConfig::Text { .. } => resolve(store, config, Field::Text),
        SourceConfig::WiFi {
            auth_type,
            is_hidden,
            ..
        } => build_wifi(store, config, *auth_type, *is_hidden),
        SourceConfig::Entity { .. } => resolve(store, config, Field::Entity),
    }
}

fn build_wifi(
    store: &dyn StateStore,
    config: &CardConfig,
    auth_type: AuthenticationType,
    is_hidden: bool,
) -> Result<String, BuildError> {
    let ssid = resolve(store, config, Field::Ssid)?;
    let mut payload = format!("WIFI:T:{auth_type};S:{};", escape_wifi(&ssid));

    if auth_type.is_password_protected() {
        let password = resolve(store, config, Field::Password)?;
        payload.push_str(&format!("P:{};", escape_wifi(&password)));
    }

    if is_hidden {
        payload.push_str("H:true");
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::resolve::{EntityState, States};

    fn build_raw(states: &States, raw: Value) -> Result<String, BuildError> {
        build(states, &CardConfig::from_raw(&raw).unwrap())
    }

    #[test]
    fn escapes_each_special_character_once() {
        assert_eq!(escape_wifi(r#"a;b\c"d:e,f"#), r#"a\;b\\c\"d\:e\,f"#);
        assert_eq!(escape_wifi(";;"), r"\;\;");
        assert_eq!(escape_wifi(r"\\"), r"\\\\");
        assert_eq!(escape_wifi("p@ss word"), "p@ss word");
        assert_eq!(escape_wifi(""), "");
    }

    #[test]
    fn text_is_returned_verbatim() {
        let text = r#"https://example.com/?a=1;b="2""#;
        assert_eq!(
            build_raw(&States::new(), json!({"source": "text", "text": text})).unwrap(),
            text
        );
    }

    #[test]
    fn hidden_wpa_network_payload() {
        let raw = json!({
            "source": "wifi",
            "auth_type": "WPA",
            "ssid": "Home Net",
            "password": "p@ss;word",
            "is_hidden": true
        });
        assert_eq!(
            build_raw(&States::new(), raw).unwrap(),
            r"WIFI:T:WPA;S:Home Net;P:p@ss\;word;H:true"
        );
    }

    #[test]
    fn hidden_marker_only_for_hidden_networks() {
        let visible = json!({"source": "wifi", "auth_type": "WEP", "ssid": "A", "password": "B"});
        assert_eq!(
            build_raw(&States::new(), visible).unwrap(),
            "WIFI:T:WEP;S:A;P:B;"
        );

        let explicit = json!({
            "source": "wifi", "auth_type": "WEP", "ssid": "A", "password": "B", "is_hidden": false
        });
        assert_eq!(
            build_raw(&States::new(), explicit).unwrap(),
            "WIFI:T:WEP;S:A;P:B;"
        );
    }

    #[test]
    fn open_network_omits_password() {
        let raw = json!({"source": "wifi", "auth_type": "nopass", "ssid": "Cafe: free", "password": "x"});
        assert_eq!(
            build_raw(&States::new(), raw).unwrap(),
            r"WIFI:T:nopass;S:Cafe\: free;"
        );
    }

    #[test]
    fn open_network_ignores_malformed_password() {
        let raw = json!({"source": "wifi", "auth_type": "nopass", "ssid": "Cafe", "password": 42});
        let config = CardConfig::from_raw(&raw).unwrap();
        assert_eq!(config.field(Field::Password), None);
        assert_eq!(build(&States::new(), &config).unwrap(), "WIFI:T:nopass;S:Cafe;");
    }

    #[test]
    fn wifi_fields_can_come_from_entities() {
        let states = States::new()
            .with("input_text.ssid", EntityState::new("Lab;5G"))
            .with(
                "sensor.router",
                EntityState::new("on").with_attribute("psk", "k,e,y"),
            );
        let raw = json!({
            "source": "wifi",
            "auth_type": "WPA",
            "ssid": {"entity": "input_text.ssid"},
            "password": {"entity": "sensor.router", "attribute": "psk"}
        });
        assert_eq!(
            build_raw(&states, raw).unwrap(),
            r"WIFI:T:WPA;S:Lab\;5G;P:k\,e\,y;"
        );
    }

    #[test]
    fn resolver_failures_propagate() {
        let raw = json!({
            "source": "wifi",
            "auth_type": "WPA",
            "ssid": "Home",
            "password": {"entity": "input_text.gone"}
        });
        let err = build_raw(&States::new(), raw).unwrap_err();
        assert_eq!(err.code(), "validation.password.unknown_entity");

        let raw = json!({"source": "wifi", "auth_type": "WPA", "ssid": "Home"});
        let err = build_raw(&States::new(), raw).unwrap_err();
        assert_eq!(err.code(), "validation.password.missing");
    }

    #[test]
    fn entity_payload_is_not_escaped() {
        let states = States::new().with("sensor.code", EntityState::new("a;b:c"));
        assert_eq!(
            build_raw(&states, json!({"source": "entity", "entity": "sensor.code"})).unwrap(),
            "a;b:c"
        );
    }
}
