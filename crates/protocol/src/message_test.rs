//! Tests for stream message decoding

use crate::{ProtocolError, StreamMessage};

#[test]
fn test_decode_tweet() {
    let line = br#"{"id":10,"id_str":"10","text":"hello","user":{"id":1,"screen_name":"a"}}"#;
    let msg = StreamMessage::decode(line).unwrap();

    match msg {
        StreamMessage::Tweet(tweet) => {
            assert_eq!(tweet.id, 10);
            assert_eq!(tweet.text, "hello");
        }
        other => panic!("expected tweet, got {:?}", other),
    }
}

#[test]
fn test_decode_warning() {
    let line = br#"{"warning":{"code":"FALLING_BEHIND","message":"slow down","percent_full":60}}"#;
    let msg = StreamMessage::decode(line).unwrap();

    match msg {
        StreamMessage::Warning(w) => {
            assert_eq!(w.code, "FALLING_BEHIND");
            assert_eq!(w.message, "slow down");
            assert_eq!(w.percent_full, Some(60));
        }
        other => panic!("expected warning, got {:?}", other),
    }
}

#[test]
fn test_decode_limit() {
    let msg = StreamMessage::decode(br#"{"limit":{"track":1234}}"#).unwrap();
    assert_eq!(msg, StreamMessage::Limit { track: 1234 });
    assert_eq!(msg.kind(), "limit");
}

#[test]
fn test_decode_disconnect() {
    let line = br#"{"disconnect":{"code":4,"stream_name":"filter","reason":"duplicate"}}"#;
    let msg = StreamMessage::decode(line).unwrap();

    match msg {
        StreamMessage::Disconnect(d) => {
            assert_eq!(d.code, 4);
            assert_eq!(d.reason, "duplicate");
        }
        other => panic!("expected disconnect, got {:?}", other),
    }
}

#[test]
fn test_decode_delete_is_other() {
    let line = br#"{"delete":{"status":{"id":1,"user_id":2}}}"#;
    let msg = StreamMessage::decode(line).unwrap();
    assert_eq!(msg.kind(), "other");
}

#[test]
fn test_decode_non_object_is_other() {
    let msg = StreamMessage::decode(b"[1,2,3]").unwrap();
    assert!(matches!(msg, StreamMessage::Other(_)));
}

#[test]
fn test_decode_blank_line() {
    assert!(matches!(
        StreamMessage::decode(b"  \r\n"),
        Err(ProtocolError::Empty)
    ));
}

#[test]
fn test_decode_invalid_json() {
    assert!(matches!(
        StreamMessage::decode(b"{\"id\":"),
        Err(ProtocolError::Json(_))
    ));
}

#[test]
fn test_decode_tweet_missing_user_fails() {
    // Looks like a tweet but the user object is malformed
    let line = br#"{"id":10,"text":"hello","user":{"id":1}}"#;
    assert!(StreamMessage::decode(line).is_err());
}
