//! QR symbol rendering for the card.
//!
//! Encodes text into a QR code, rasterizes it with a quiet zone at a target
//! pixel width, and packs the PNG into a `data:` URL the card can display.

pub mod qr;

use serde::{Deserialize, Serialize};

pub use qr::{encode_data_url, encode_png, render_qr};

/// A `data:image/png;base64,...` URL.
pub type DataUrl = String;

/// Allowed range for [`QualityOptions::width`].
pub const WIDTH_RANGE: std::ops::RangeInclusive<u32> = 64..=4096;
/// Allowed range for [`QualityOptions::margin`].
pub const MARGIN_RANGE: std::ops::RangeInclusive<u32> = 0..=16;

/// Errors from rendering a QR code.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("QR encode error: {0}")]
    Qr(String),

    #[error("PNG encode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid quality options: {0}")]
    InvalidOptions(String),

    #[error("Encoder task failed: {0}")]
    Task(String),
}

/// Output size settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityOptions {
    /// Quiet zone around the symbol, in modules.
    pub margin: u32,
    /// Target image width (and height) in pixels.
    pub width: u32,
}

impl Default for QualityOptions {
    fn default() -> Self {
        Self {
            margin: 1,
            width: 500,
        }
    }
}

impl QualityOptions {
    pub fn validate(&self) -> Result<(), EncodeError> {
        if !WIDTH_RANGE.contains(&self.width) {
            return Err(EncodeError::InvalidOptions(format!(
                "width must be between {} and {}",
                WIDTH_RANGE.start(),
                WIDTH_RANGE.end()
            )));
        }
        if !MARGIN_RANGE.contains(&self.margin) {
            return Err(EncodeError::InvalidOptions(format!(
                "margin must be between {} and {}",
                MARGIN_RANGE.start(),
                MARGIN_RANGE.end()
            )));
        }
        Ok(())
    }
}

/// Turns input text into a displayable image.
pub trait Encoder: Send + Sync {
    fn encode(&self, text: &str, quality: &QualityOptions) -> Result<DataUrl, EncodeError>;
}

/// Default [`Encoder`] producing PNG data URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrEncoder;

impl Encoder for QrEncoder {
    fn encode(&self, text: &str, quality: &QualityOptions) -> Result<DataUrl, EncodeError> {
        encode_data_url(text, quality)
    }
}
