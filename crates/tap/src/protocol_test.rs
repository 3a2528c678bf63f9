//! Tests for the subscriber wire protocol

use super::*;
use serde_json::Value;

#[test]
fn test_encode_frame_wraps_payload_as_string() {
    let payload = r#"{"id":1,"text":"hello \"world\""}"#;
    let frame = encode_frame("tweet", payload).unwrap();

    let value: Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(value["event"], "tweet");
    assert_eq!(value["data"], payload);

    let inner: Value = serde_json::from_str(value["data"].as_str().unwrap()).unwrap();
    assert_eq!(inner["id"], 1);
}

#[test]
fn test_encode_frame_is_deterministic() {
    let a = encode_frame("tweet", "{}").unwrap();
    let b = encode_frame("tweet", "{}").unwrap();
    assert_eq!(a, b);
    assert_eq!(&*a, r#"{"event":"tweet","data":"{}"}"#);
}

#[test]
fn test_decode_join_and_leave() {
    assert_eq!(
        ClientMessage::decode(r#"{"event":"join","data":"rust"}"#).unwrap(),
        ClientMessage::Join("rust".into())
    );

    let leave = ClientMessage::decode(r#"{"event":"leave","data":"rust"}"#).unwrap();
    assert_eq!(leave, ClientMessage::Leave("rust".into()));
    assert_eq!(leave.group(), "rust");
}

#[test]
fn test_decode_rejects_unknown_event() {
    let err = ClientMessage::decode(r#"{"event":"tweet","data":"x"}"#).unwrap_err();
    assert!(matches!(err, TapError::Protocol(_)));
}

#[test]
fn test_decode_rejects_bad_group() {
    assert!(ClientMessage::decode(r#"{"event":"join","data":"  "}"#).is_err());

    let long = "g".repeat(MAX_GROUP_NAME + 1);
    let text = format!(r#"{{"event":"join","data":"{}"}}"#, long);
    assert!(ClientMessage::decode(&text).is_err());
}

#[test]
fn test_decode_rejects_garbage() {
    assert!(ClientMessage::decode("not json").is_err());
    assert!(ClientMessage::decode(r#"{"event":"join"}"#).is_err());
}

#[test]
fn test_encode_matches_wire_shape() {
    let text = ClientMessage::Join("rust".into()).encode().unwrap();
    assert_eq!(text, r#"{"event":"join","data":"rust"}"#);
    assert_eq!(
        ClientMessage::decode(&text).unwrap(),
        ClientMessage::Join("rust".into())
    );
}
