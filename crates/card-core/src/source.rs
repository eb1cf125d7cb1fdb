//! Content-source variants and Wi-Fi authentication kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Returned when a tag does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Which configuration shape and construction rule applies to a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Text,
    WiFi,
    Entity,
}

impl SourceType {
    pub const ALL: [SourceType; 3] = [Self::Text, Self::WiFi, Self::Entity];

    /// Tag as written in the card configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::WiFi => "wifi",
            Self::Entity => "entity",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "source",
                value: s.to_string(),
            })
    }
}

/// Wi-Fi authentication kind. The wire token doubles as the `T:` value of the
/// Wi-Fi payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthenticationType {
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "nopass")]
    NoPass,
}

impl AuthenticationType {
    pub const ALL: [AuthenticationType; 3] = [Self::Wep, Self::Wpa, Self::NoPass];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wep => "WEP",
            Self::Wpa => "WPA",
            Self::NoPass => "nopass",
        }
    }

    /// Whether a network using this kind needs a password.
    pub fn is_password_protected(self) -> bool {
        matches!(self, Self::Wep | Self::Wpa)
    }
}

impl fmt::Display for AuthenticationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthenticationType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|auth| auth.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "auth_type",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_type_parses_config_tags() {
        assert_eq!("text".parse::<SourceType>().unwrap(), SourceType::Text);
        assert_eq!("wifi".parse::<SourceType>().unwrap(), SourceType::WiFi);
        assert_eq!("entity".parse::<SourceType>().unwrap(), SourceType::Entity);
        assert!("WiFi".parse::<SourceType>().is_err());
        assert!("url".parse::<SourceType>().is_err());
    }

    #[test]
    fn source_type_serde_matches_as_str() {
        for source in SourceType::ALL {
            let json = serde_json::to_value(source).unwrap();
            assert_eq!(json, serde_json::Value::String(source.as_str().into()));
        }
    }

    #[test]
    fn password_protection_is_derived_from_kind() {
        assert!(AuthenticationType::Wep.is_password_protected());
        assert!(AuthenticationType::Wpa.is_password_protected());
        assert!(!AuthenticationType::NoPass.is_password_protected());
    }

    #[test]
    fn auth_type_parsing_is_case_sensitive() {
        assert_eq!(
            "nopass".parse::<AuthenticationType>().unwrap(),
            AuthenticationType::NoPass
        );
        let err = "wpa".parse::<AuthenticationType>().unwrap_err();
        assert_eq!(err.kind, "auth_type");
        assert_eq!(err.value, "wpa");
    }
}
