use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use card_core::config::raw_from_yaml;
use card_core::{Catalog, EntityState, States};
use qr_card::{CardOptions, CardView, Phase, QrCodeCard, spawn, stub_config};
use qr_render::{Encoder, QrEncoder};
use tokio::time::timeout;

const WIFI_YAML: &str = r#"
type: custom:qr-code-card
title: Guest network
source: wifi
auth_type: WPA
ssid: Guests
password:
  entity: input_text.guest_password
is_hidden: true
"#;

fn png_bytes(data_url: &str) -> Vec<u8> {
    let encoded = data_url
        .strip_prefix("data:image/png;base64,")
        .expect("not a PNG data URL");
    STANDARD.decode(encoded).unwrap()
}

#[test]
fn yaml_wifi_card_renders_png() {
    let states = States::new().with(
        "input_text.guest_password",
        EntityState::new("pa;ss"),
    );
    let mut card = QrCodeCard::new(CardOptions::default()).unwrap();
    card.set_states(Arc::new(states));

    let request = card
        .set_config(Some(raw_from_yaml(WIFI_YAML).unwrap()))
        .unwrap()
        .unwrap();
    assert_eq!(request.input, r"WIFI:T:WPA;S:Guests;P:pa\;ss;H:true");

    let result = QrEncoder.encode(&request.input, &request.quality);
    assert!(card.complete(&request, result));
    assert_eq!(card.phase(), Phase::Ready);

    match card.view() {
        CardView::Image { title, data_url, debug_input } => {
            assert_eq!(title.as_deref(), Some("Guest network"));
            assert_eq!(&png_bytes(&data_url)[..4], b"\x89PNG");
            assert!(debug_input.is_none());
        }
        other => panic!("unexpected view {other:?}"),
    }
    assert_eq!(card.watched_entities(), vec!["input_text.guest_password"]);
}

#[test]
fn literal_only_wifi_rejects_entity_password() {
    let options = CardOptions::from_json(r#"{"features": {"wifi_entity_fields": false}}"#).unwrap();
    let mut card: QrCodeCard = QrCodeCard::new(options).unwrap();
    let request = card
        .set_config(Some(raw_from_yaml(WIFI_YAML).unwrap()))
        .unwrap();
    assert!(request.is_none());
    assert_eq!(card.error_codes(), vec!["validation.password.entity.unsupported"]);
    assert_eq!(
        card.view().first_error(),
        Some("Password can not refer to an entity")
    );
}

#[test]
fn stub_config_renders_description() {
    let stub = stub_config(Catalog::shared(), None);
    let mut card: QrCodeCard = QrCodeCard::new(CardOptions::default()).unwrap();
    let request = card.set_config(Some(stub)).unwrap().unwrap();
    assert_eq!(
        request.input,
        "Generate a QR code from text, Wi-Fi credentials or an entity state"
    );
}

#[tokio::test]
async fn runtime_renders_with_real_encoder() {
    let card: QrCodeCard = QrCodeCard::new(CardOptions::default()).unwrap();
    let (handle, _task) = spawn(card, Arc::new(QrEncoder));
    handle
        .set_config(Some(serde_json::json!({"source": "text", "text": "https://example.com"})))
        .await
        .unwrap();

    let mut views = handle.subscribe();
    let view = timeout(
        Duration::from_secs(10),
        views.wait_for(|view| view.data_url().is_some()),
    )
    .await
    .expect("timed out waiting for image")
    .unwrap()
    .clone();
    let png = png_bytes(view.data_url().unwrap());
    assert_eq!(&png[..4], b"\x89PNG");
}
