//! What the rendering layer shows for a card.

use qr_render::DataUrl;
use serde::Serialize;

/// Displayable state of a card. Error messages are already localized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardView {
    Loading {
        message: String,
    },
    Image {
        title: Option<String>,
        data_url: DataUrl,
        /// The encoded text, present only when the configuration enables `debug`.
        debug_input: Option<String>,
    },
    Error {
        messages: Vec<String>,
    },
}

impl CardView {
    /// The message an error card would show.
    pub fn first_error(&self) -> Option<&str> {
        match self {
            Self::Error { messages } => messages.first().map(String::as_str),
            _ => None,
        }
    }

    pub fn data_url(&self) -> Option<&str> {
        match self {
            Self::Image { data_url, .. } => Some(data_url),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}
