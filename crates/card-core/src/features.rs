//! Optional capabilities of the card.

use serde::{Deserialize, Serialize};

/// Capability flags that change which configurations are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Allow `ssid` and `password` to reference entities, and rebuild when
    /// those entities change.
    pub wifi_entity_fields: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            wifi_entity_fields: true,
        }
    }
}

impl Features {
    /// Literal-only Wi-Fi fields.
    pub fn literal_wifi() -> Self {
        Self {
            wifi_entity_fields: false,
        }
    }
}
