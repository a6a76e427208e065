// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::MAX_PAYLOAD_BYTES;
use proptest::prelude::*;
use yare::parameterized;

#[parameterized(
    subscribe = { r#"{"type":"subscribe","channel":"project:1"}"#, ClientFrame::Subscribe { channel: "project:1".into() } },
    unsubscribe = { r#"{"type":"unsubscribe","channel":"issue:2"}"#, ClientFrame::Unsubscribe { channel: "issue:2".into() } },
    ping = { r#"{"type":"ping"}"#, ClientFrame::Ping },
)]
fn decodes_known_frames(raw: &str, want: ClientFrame) {
    assert_eq!(decode_client_frame(raw, MAX_PAYLOAD_BYTES).unwrap(), want);
}

#[test]
fn unknown_tag_is_reported_not_fatal() {
    let err = decode_client_frame(r#"{"type":"launch_missiles"}"#, MAX_PAYLOAD_BYTES).unwrap_err();
    assert_eq!(err, ProtocolError::UnknownType("launch_missiles".to_string()));
}

#[parameterized(
    not_json = { "][" },
    no_tag = { r#"{"channel":"project:1"}"# },
    wrong_tag_type = { r#"{"type":42}"# },
)]
fn malformed_frames(raw: &str) {
    assert!(matches!(
        decode_client_frame(raw, MAX_PAYLOAD_BYTES),
        Err(ProtocolError::Malformed(_))
    ));
}

#[test]
fn payload_cap_is_enforced() {
    let fat = format!(r#"{{"type":"subscribe","channel":"{}"}}"#, "x".repeat(MAX_PAYLOAD_BYTES));
    assert!(matches!(
        decode_client_frame(&fat, MAX_PAYLOAD_BYTES),
        Err(ProtocolError::PayloadTooLarge { .. })
    ));
}

#[test]
fn missing_required_field_is_unknown_shape() {
    // A known tag with a missing field fails the typed parse.
    let err = decode_client_frame(r#"{"type":"subscribe"}"#, MAX_PAYLOAD_BYTES).unwrap_err();
    assert_eq!(err, ProtocolError::UnknownType("subscribe".to_string()));
}

#[test]
fn server_frames_use_snake_case_tags() {
    let connected = ServerFrame::Connected { client_id: "c-1".into() }.to_json();
    assert!(connected.contains(r#""type":"connected""#));
    assert!(connected.contains(r#""clientId":"c-1""#));

    let event = ServerFrame::Event {
        channel: "issue:9".into(),
        event: "issue.updated".into(),
        data: serde_json::json!({"stage": "implement"}),
    }
    .to_json();
    assert!(event.contains(r#""type":"event""#));
    assert!(event.contains(r#""channel":"issue:9""#));
}

#[test]
fn client_frames_round_trip() {
    for frame in [
        ClientFrame::Subscribe { channel: "run:run-1".into() },
        ClientFrame::Unsubscribe { channel: "run:run-1".into() },
        ClientFrame::Ping,
    ] {
        let raw = serde_json::to_string(&frame).unwrap();
        assert_eq!(decode_client_frame(&raw, MAX_PAYLOAD_BYTES).unwrap(), frame);
    }
}

proptest! {
    // The decoder never panics on arbitrary input.
    #[test]
    fn decoder_is_total(raw in "\\PC{0,256}") {
        let _ = decode_client_frame(&raw, MAX_PAYLOAD_BYTES);
    }

    #[test]
    fn server_frame_error_json_is_always_valid(msg in "\\PC{0,100}") {
        let json = ServerFrame::error(msg).to_json();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed.get("type").and_then(|v| v.as_str()), Some("error"));
    }
}
