//! Host-facing QR code card.
//!
//! Wires the configuration pipeline from `card-core` to the encoder from
//! `qr-render`: a [`QrCodeCard`] state machine, an async [`runtime`] that
//! drives it from host events, the [`CardEditor`] form model and the
//! [`CardView`] handed to the rendering layer.

pub mod card;
pub mod editor;
pub mod error;
pub mod options;
pub mod runtime;
pub mod view;

pub use card::{EncodeRequest, Phase, QrCodeCard, stub_config};
pub use editor::CardEditor;
pub use error::CardError;
pub use options::CardOptions;
pub use runtime::{CardEvent, CardHandle, spawn};
pub use view::CardView;

/// Element type the card registers under.
pub const CARD_TYPE: &str = "custom:qr-code-card";
