//! Async driver for a [`QrCodeCard`].
//!
//! Host events arrive over an mpsc channel; encoding runs on the blocking pool
//! so a slow encode never delays newer events. The current [`CardView`] is
//! published through a watch channel.

use std::sync::Arc;

use card_core::{StateStore, States};
use qr_render::{DataUrl, EncodeError, Encoder};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::CardError;
use crate::card::{EncodeRequest, QrCodeCard};
use crate::view::CardView;

/// Maximum number of host events waiting to be applied.
const EVENT_CAPACITY: usize = 32;

/// Something the host reports to the card.
#[derive(Debug)]
pub enum CardEvent<S = States> {
    Config(Option<Value>),
    States(Arc<S>),
    Locale(Option<String>),
}

/// Host-side handle to a running card.
#[derive(Debug)]
pub struct CardHandle<S = States> {
    events: mpsc::Sender<CardEvent<S>>,
    view: watch::Receiver<CardView>,
}

impl<S> Clone for CardHandle<S> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            view: self.view.clone(),
        }
    }
}

impl<S> CardHandle<S> {
    pub async fn set_config(&self, config: Option<Value>) -> Result<(), CardError> {
        self.send(CardEvent::Config(config)).await
    }

    pub async fn set_states(&self, states: Arc<S>) -> Result<(), CardError> {
        self.send(CardEvent::States(states)).await
    }

    pub async fn set_locale(&self, locale: Option<String>) -> Result<(), CardError> {
        self.send(CardEvent::Locale(locale)).await
    }

    /// The most recently published view.
    pub fn view(&self) -> CardView {
        self.view.borrow().clone()
    }

    /// Receiver notified whenever the view changes.
    pub fn subscribe(&self) -> watch::Receiver<CardView> {
        self.view.clone()
    }

    async fn send(&self, event: CardEvent<S>) -> Result<(), CardError> {
        self.events
            .send(event)
            .await
            .map_err(|_| CardError::RuntimeStopped)
    }
}

/// Start driving `card` on the current tokio runtime.
///
/// The task ends once every [`CardHandle`] has been dropped.
pub fn spawn<S>(card: QrCodeCard<S>, encoder: Arc<dyn Encoder>) -> (CardHandle<S>, JoinHandle<()>)
where
    S: StateStore + Send + Sync + 'static,
{
    let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);
    let (view_tx, view_rx) = watch::channel(card.view());
    let task = tokio::spawn(run(card, encoder, events_rx, view_tx));
    info!("QR code card runtime started");
    (
        CardHandle {
            events: events_tx,
            view: view_rx,
        },
        task,
    )
}

type EncodeOutcome = (EncodeRequest, Result<DataUrl, EncodeError>);

async fn run<S>(
    mut card: QrCodeCard<S>,
    encoder: Arc<dyn Encoder>,
    mut events: mpsc::Receiver<CardEvent<S>>,
    view: watch::Sender<CardView>,
) where
    S: StateStore + Send + Sync + 'static,
{
    let mut encodes: JoinSet<EncodeOutcome> = JoinSet::new();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let request = match event {
                    CardEvent::Config(config) => match card.set_config(config) {
                        Ok(request) => request,
                        Err(e) => {
                            warn!(error = %e, "Rejected card configuration");
                            None
                        }
                    },
                    CardEvent::States(states) => card.set_states(states),
                    CardEvent::Locale(locale) => {
                        card.set_host_locale(locale);
                        None
                    }
                };
                if let Some(request) = request {
                    start_encode(&mut encodes, &encoder, request);
                }
            }
            Some(joined) = encodes.join_next(), if !encodes.is_empty() => {
                match joined {
                    Ok((request, result)) => {
                        card.complete(&request, result);
                    }
                    Err(e) => warn!(error = %e, "Encode task did not finish"),
                }
            }
        }
        publish(&view, card.view());
    }

    encodes.abort_all();
    info!("QR code card runtime stopped");
}

fn start_encode(
    encodes: &mut JoinSet<EncodeOutcome>,
    encoder: &Arc<dyn Encoder>,
    request: EncodeRequest,
) {
    debug!(request = request.id, len = request.input.len(), "Starting QR encode");
    let encoder = Arc::clone(encoder);
    encodes.spawn(async move {
        let input = request.input.clone();
        let quality = request.quality;
        let result = tokio::task::spawn_blocking(move || encoder.encode(&input, &quality))
            .await
            .unwrap_or_else(|e| Err(EncodeError::Task(e.to_string())));
        (request, result)
    });
}

fn publish(view: &watch::Sender<CardView>, next: CardView) {
    view.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        *current = next;
        true
    });
}
