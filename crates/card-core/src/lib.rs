//! Core logic of the QR code card.
//!
//! Turns a declarative card configuration into the exact text to encode:
//! validation of the raw configuration, resolution of entity-backed fields,
//! and per-source construction of the input string (including Wi-Fi payload
//! escaping). Nothing here performs I/O; live entity state and message
//! catalogs are passed in explicitly.

pub mod build;
pub mod config;
pub mod error;
pub mod features;
pub mod localize;
pub mod resolve;
pub mod source;
pub mod validate;
pub mod watch;

pub use build::{build, escape_wifi};
pub use config::{CardConfig, EntityRef, Field, FieldValue, SourceConfig};
pub use error::{BuildError, Translatable, ValidationError};
pub use features::Features;
pub use localize::{Catalog, Translator};
pub use resolve::{EntityState, StateStore, States, resolve};
pub use source::{AuthenticationType, SourceType};
pub use validate::validate;
pub use watch::{Snapshot, watched_entities};
