//! The card state machine: validate, build, hand off to the encoder.
//!
//! ```text
//! Validating ──errors──▶ Error
//!     │
//!     ▼
//! Building ──build error / encode error──▶ Error
//!     │
//!     ▼ (encode result for the pending input)
//!   Ready
//! ```
//!
//! A new configuration, or a change to a watched entity, re-enters
//! `Validating`. Encoding itself happens outside: [`QrCodeCard`] hands out an
//! [`EncodeRequest`] and accepts the result through [`QrCodeCard::complete`],
//! ignoring results whose input is no longer the pending one.

use std::sync::Arc;

use card_core::error::{GENERATION_UNKNOWN_ERROR, INVALID_CONFIGURATION};
use card_core::localize::resolve_locale;
use card_core::{
    CardConfig, Catalog, Snapshot, StateStore, States, Translatable, Translator, build, validate,
    watched_entities,
};
use qr_render::{DataUrl, EncodeError, QualityOptions};
use serde_json::{Value, json};
use tracing::{debug, error, warn};

use crate::options::CardOptions;
use crate::view::CardView;
use crate::{CARD_TYPE, CardError};

/// Where the card is in its render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Validating,
    Building,
    Ready,
    Error,
}

/// A pending request to encode `input`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRequest {
    pub id: u64,
    pub input: String,
    pub quality: QualityOptions,
}

#[derive(Debug, Clone)]
struct Rendered {
    input: String,
    data_url: DataUrl,
}

/// One QR code card bound to a host.
pub struct QrCodeCard<S = States> {
    options: CardOptions,
    translator: Arc<dyn Translator>,
    host_locale: Option<String>,
    raw: Option<Value>,
    config: Option<CardConfig>,
    states: Option<Arc<S>>,
    watched: Snapshot,
    phase: Phase,
    errors: Vec<Translatable>,
    pending: Option<EncodeRequest>,
    rendered: Option<Rendered>,
    next_request: u64,
    rebuilds: u64,
}

impl<S: StateStore> QrCodeCard<S> {
    /// A card using the built-in message catalog.
    pub fn new(options: CardOptions) -> Result<Self, CardError> {
        Self::with_translator(options, Arc::new(Catalog::builtin()))
    }

    pub fn with_translator(
        options: CardOptions,
        translator: Arc<dyn Translator>,
    ) -> Result<Self, CardError> {
        options.validate()?;
        Ok(Self {
            options,
            translator,
            host_locale: None,
            raw: None,
            config: None,
            states: None,
            watched: Snapshot::default(),
            phase: Phase::Validating,
            errors: Vec::new(),
            pending: None,
            rendered: None,
            next_request: 0,
            rebuilds: 0,
        })
    }

    /// Accept a new configuration from the host. `None` (or JSON `null`) is
    /// rejected with a localized "invalid configuration" message.
    ///
    /// Returns the encode request to run, if the new configuration needs one.
    pub fn set_config(&mut self, config: Option<Value>) -> Result<Option<EncodeRequest>, CardError> {
        let raw = match config {
            None | Some(Value::Null) => {
                let locale = self.locale();
                let message = self
                    .translator
                    .translate(INVALID_CONFIGURATION, &[], Some(&locale));
                self.raw = None;
                self.config = None;
                self.pending = None;
                self.watched = Snapshot::default();
                self.fail(vec![Translatable::new(INVALID_CONFIGURATION)]);
                return Err(CardError::InvalidConfiguration(message));
            }
            Some(raw) => raw,
        };
        self.raw = Some(raw);
        Ok(self.rebuild("config"))
    }

    /// Accept a new snapshot of the host's entity states. Rebuilds only if a
    /// watched entity differs from what the last build observed.
    pub fn set_states(&mut self, states: Arc<S>) -> Option<EncodeRequest> {
        let changed = self.watched.differs(&*states);
        self.states = Some(states);
        if self.raw.is_none() || !changed {
            return None;
        }
        self.rebuild("states")
    }

    /// Locale reported by the host; the configuration's `language` wins over it.
    pub fn set_host_locale(&mut self, locale: Option<String>) {
        self.host_locale = locale;
    }

    /// Apply the result of encoding `request`. Returns `false` if the result was
    /// stale and ignored.
    pub fn complete(
        &mut self,
        request: &EncodeRequest,
        result: Result<DataUrl, EncodeError>,
    ) -> bool {
        let current = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.input == request.input);
        if !current {
            debug!(request = request.id, "Discarding stale encode result");
            return false;
        }

        self.pending = None;
        match result {
            Ok(data_url) => {
                self.rendered = Some(Rendered {
                    input: request.input.clone(),
                    data_url,
                });
                self.errors.clear();
                self.phase = Phase::Ready;
            }
            Err(e) => {
                warn!(request = request.id, error = %e, "QR encoding failed");
                self.fail(vec![Translatable::new(GENERATION_UNKNOWN_ERROR)]);
            }
        }
        true
    }

    /// What the rendering layer should show right now.
    pub fn view(&self) -> CardView {
        match (self.phase, &self.rendered, &self.config) {
            (Phase::Error, _, _) => {
                let locale = self.locale();
                CardView::Error {
                    messages: self
                        .errors
                        .iter()
                        .map(|message| self.translator.localize(message, Some(&locale)))
                        .collect(),
                }
            }
            (Phase::Ready, Some(rendered), Some(config)) => CardView::Image {
                title: config.title.clone(),
                data_url: rendered.data_url.clone(),
                debug_input: config.debug.then(|| rendered.input.clone()),
            },
            _ => CardView::Loading {
                message: self.translate("common.loading"),
            },
        }
    }

    /// Default configuration offered when the card is first added.
    pub fn stub_config(&self) -> Value {
        stub_config(self.translator.as_ref(), Some(&self.locale()))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Error codes of the current failure, oldest first.
    pub fn error_codes(&self) -> Vec<&str> {
        self.errors.iter().map(|message| message.key.as_str()).collect()
    }

    /// The typed configuration of the last successful validation.
    pub fn config(&self) -> Option<&CardConfig> {
        self.config.as_ref()
    }

    pub fn pending(&self) -> Option<&EncodeRequest> {
        self.pending.as_ref()
    }

    /// Text behind the currently shown image.
    pub fn rendered_input(&self) -> Option<&str> {
        self.rendered.as_ref().map(|rendered| rendered.input.as_str())
    }

    pub fn watched_entities(&self) -> Vec<&str> {
        self.watched.entity_ids().collect()
    }

    /// How many times the card re-entered `Validating`.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    fn rebuild(&mut self, trigger: &'static str) -> Option<EncodeRequest> {
        let raw = self.raw.clone()?;
        self.rebuilds += 1;
        self.phase = Phase::Validating;
        self.errors.clear();
        debug!(trigger, rebuild = self.rebuilds, "Rebuilding QR code card");

        let problems = validate(&raw, &self.options.features);
        if !problems.is_empty() {
            let messages = problems.iter().map(|e| e.message().clone()).collect();
            self.config = None;
            self.pending = None;
            self.watched = Snapshot::default();
            self.fail(messages);
            return None;
        }

        self.phase = Phase::Building;
        let config = match CardConfig::from_raw(&raw) {
            Ok(config) => config,
            Err(e) => {
                self.config = None;
                self.pending = None;
                self.watched = Snapshot::default();
                self.fail(vec![e.to_translatable()]);
                return None;
            }
        };

        let empty = States::default();
        let store: &dyn StateStore = match &self.states {
            Some(states) => &**states,
            None => &empty,
        };
        let watched = Snapshot::capture(
            &watched_entities(&config, &self.options.features),
            store,
        );
        let built = build(store, &config);

        self.watched = watched;
        self.config = Some(config);

        let input = match built {
            Ok(input) => input,
            Err(e) => {
                self.pending = None;
                self.fail(vec![e.to_translatable()]);
                return None;
            }
        };

        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.input == input)
        {
            debug!("Input unchanged, encode already in flight");
            return None;
        }
        if self
            .rendered
            .as_ref()
            .is_some_and(|rendered| rendered.input == input)
        {
            debug!("Input unchanged, reusing rendered image");
            self.pending = None;
            self.phase = Phase::Ready;
            return None;
        }

        self.next_request += 1;
        let request = EncodeRequest {
            id: self.next_request,
            input,
            quality: self.options.quality,
        };
        self.pending = Some(request.clone());
        Some(request)
    }

    fn fail(&mut self, messages: Vec<Translatable>) {
        for message in &messages {
            error!(code = %message.key, "QR code card error");
        }
        self.errors = messages;
        self.phase = Phase::Error;
    }

    fn locale(&self) -> String {
        let language = self
            .raw
            .as_ref()
            .and_then(|raw| raw.get("language"))
            .and_then(Value::as_str);
        resolve_locale(language, self.host_locale.as_deref())
    }

    fn translate(&self, key: &str) -> String {
        self.translator.translate(key, &[], Some(&self.locale()))
    }
}

/// Default configuration: a text card carrying the card description.
pub fn stub_config(translator: &dyn Translator, locale: Option<&str>) -> Value {
    json!({
        "type": CARD_TYPE,
        "source": "text",
        "text": translator.translate("common.description", &[], locale),
    })
}
