//! Wire compatibility tests against hand-assembled payloads.
//!
//! These bytes and JSON documents are what another protobuf implementation
//! of the chat schema produces; decoding them and re-encoding our own
//! messages must agree exactly.

use chatwire_proto::binary::{self, BinaryReadOptions};
use chatwire_proto::json::{self, JsonReadOptions, JsonWriteOptions};
use chatwire_proto::registry;
use chatwire_proto::{
    ConnectServerRequest, DynamicMessage, Message, SendMessageRequest, WireError, WireMessage,
};
use serde_json::json;

#[test]
fn connect_request_alice() {
    let req = ConnectServerRequest::new("alice");

    let bytes = req.encode_to_vec();
    assert_eq!(bytes, b"\x0a\x05alice");
    assert_eq!(
        req.to_json_string(JsonWriteOptions::default(), false),
        r#"{"userName":"alice"}"#
    );

    let from_bytes = ConnectServerRequest::decode(&bytes).unwrap();
    let from_json =
        ConnectServerRequest::from_json_str(r#"{"userName":"alice"}"#, JsonReadOptions::default())
            .unwrap();
    assert!(ConnectServerRequest::equals(Some(&from_bytes), Some(&req)));
    assert!(ConnectServerRequest::equals(Some(&from_json), Some(&req)));
}

#[test]
fn send_message_request_golden_bytes() {
    // SendMessageRequest { message: Message { user_name: "bo", content: "hi" } }
    let golden = [0x0a, 0x08, 0x12, 0x02, b'b', b'o', 0x1a, 0x02, b'h', b'i'];
    let req = SendMessageRequest::new(Message::new("bo", "hi"));
    assert_eq!(req.encode_to_vec(), golden);
    assert_eq!(SendMessageRequest::decode(&golden).unwrap(), req);
}

#[test]
fn fields_in_any_order_decode() {
    // content before user_name
    let bytes = [0x1a, 0x01, b'c', 0x12, 0x01, b'u'];
    assert_eq!(Message::decode(&bytes).unwrap(), Message::new("u", "c"));
}

#[test]
fn unicode_content_is_byte_exact() {
    let msg = Message::new("zoë", "héllo 🎉");
    let bytes = msg.encode_to_vec();
    let content_bytes = "héllo 🎉".as_bytes();
    assert!(bytes.windows(content_bytes.len()).any(|w| w == content_bytes));

    let decoded = Message::decode(&bytes).unwrap();
    assert_eq!(decoded.content.as_bytes(), content_bytes);

    let text = msg.to_json_string(JsonWriteOptions::default(), false);
    let back = Message::from_json_str(&text, JsonReadOptions::default()).unwrap();
    assert_eq!(back.content.as_bytes(), content_bytes);
}

#[test]
fn newer_schema_fields_are_forwarded() {
    // A newer Message with an extra `sent_at` (field 4, varint) and
    // `room` (field 5, string).
    let newer = [
        0x12, 0x01, b'u', 0x1a, 0x01, b'c', 0x20, 0x96, 0x01, 0x2a, 0x02, b'r', b'1',
    ];
    let msg = Message::decode(&newer).unwrap();
    assert_eq!(msg, Message::new("u", "c"));
    assert_eq!(msg.encode_to_vec(), newer);

    let dropped = Message::decode_with(
        &newer,
        BinaryReadOptions {
            read_unknown_fields: false,
        },
    )
    .unwrap();
    assert_eq!(dropped.encode_to_vec(), [0x12, 0x01, b'u', 0x1a, 0x01, b'c']);
}

#[test]
fn unknown_fields_inside_nested_message_survive() {
    let inner = [0x12, 0x01, b'u', 0x48, 0x01];
    let mut outer = vec![0x0a, inner.len() as u8];
    outer.extend_from_slice(&inner);

    let req = SendMessageRequest::decode(&outer).unwrap();
    assert_eq!(req.validate().unwrap().user_name, "u");
    assert_eq!(req.encode_to_vec(), outer);
}

#[test]
fn error_kinds_are_distinguishable() {
    assert!(matches!(
        Message::decode(&[0x12, 0x05, b'u']),
        Err(WireError::MalformedBinary(_))
    ));
    assert!(matches!(
        Message::decode(&[0x12, 0x01, 0xff]),
        Err(WireError::InvalidUtf8 { field: "user_name" })
    ));
    assert!(matches!(
        SendMessageRequest::decode(&[0x0d, 0, 0, 0, 0]),
        Err(WireError::KindMismatch { field: "message", .. })
    ));
    assert!(matches!(
        Message::from_json_str("[]", JsonReadOptions::default()),
        Err(WireError::MalformedJson(_))
    ));
    assert!(matches!(
        Message::from_json_str(r#"{"emoji":"x"}"#, JsonReadOptions { strict: true }),
        Err(WireError::StrictUnknownField(_))
    ));
}

#[test]
fn heterogeneous_producers_json() {
    let camel = json!({"message": {"userName": "u", "content": "c"}});
    let snake = json!({"message": {"user_name": "u", "content": "c"}});
    let a = SendMessageRequest::from_json(&camel).unwrap();
    let b = SendMessageRequest::from_json(&snake).unwrap();
    assert_eq!(a, b);
}

#[test]
fn every_type_builds_to_minimal_payload() {
    for desc in registry::all() {
        let msg = DynamicMessage::build(desc, std::iter::empty()).unwrap();
        assert!(binary::encode(&msg).is_empty(), "{desc}");
        assert_eq!(json::to_json(&msg), json!({}), "{desc}");
        assert_eq!(binary::decode(desc, &[]).unwrap(), msg);
    }
}
