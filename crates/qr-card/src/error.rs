use qr_render::EncodeError;

/// Errors surfaced to the host by the card itself.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    /// The host passed no configuration. Carries the localized message.
    #[error("{0}")]
    InvalidConfiguration(String),

    #[error("Invalid card options: {0}")]
    Options(#[from] EncodeError),

    #[error("Options parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Card runtime has stopped")]
    RuntimeStopped,
}
