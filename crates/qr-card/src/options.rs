//! Host-supplied settings for a card instance.

use card_core::Features;
use qr_render::QualityOptions;
use serde::{Deserialize, Serialize};

use crate::CardError;

/// Settings that are not part of the persisted card configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardOptions {
    pub quality: QualityOptions,
    pub features: Features,
}

impl CardOptions {
    /// Parse options from JSON, filling missing keys with defaults.
    pub fn from_json(text: &str) -> Result<Self, CardError> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), CardError> {
        self.quality.validate()?;
        Ok(())
    }
}
