//! Property-based codec tests.
//!
//! Uses proptest to verify:
//! 1. Any message survives binary encode → decode.
//! 2. Any message survives JSON encode → decode.
//! 3. Equality is reflexive and symmetric.
//! 4. Random bytes never cause a panic in `decode` (returns `Err` gracefully).
//! 5. Unknown fields appended to a valid payload are skipped and preserved.

use chatwire_proto::json::{JsonReadOptions, JsonWriteOptions};
use chatwire_proto::registry;
use chatwire_proto::wire;
use chatwire_proto::{
    ConnectServerRequest, DynamicMessage, Message, SendMessageRequest, WireMessage, binary,
};
use proptest::prelude::*;

// --- Strategies ---

/// Arbitrary Unicode text, including empty strings.
fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), ".{0,64}", "[a-z]{1,12}"]
}

fn arb_message() -> impl Strategy<Value = Message> {
    (arb_text(), arb_text()).prop_map(|(user_name, content)| Message::new(user_name, content))
}

fn arb_connect_request() -> impl Strategy<Value = ConnectServerRequest> {
    arb_text().prop_map(ConnectServerRequest::new)
}

fn arb_send_request() -> impl Strategy<Value = SendMessageRequest> {
    proptest::option::of(arb_message()).prop_map(|message| SendMessageRequest {
        message,
        ..Default::default()
    })
}

/// Field numbers the chat schema does not use in any message.
fn arb_unknown_field_number() -> impl Strategy<Value = u32> {
    4u32..=wire::MAX_FIELD_NUMBER
}

// --- Property tests ---

proptest! {
    #[test]
    fn message_binary_round_trip(msg in arb_message()) {
        let bytes = msg.encode_to_vec();
        prop_assert_eq!(bytes.len(), msg.encoded_len());
        let decoded = Message::decode(&bytes).expect("decode should succeed");
        prop_assert_eq!(decoded, msg);
    }

    #[test]
    fn connect_request_binary_round_trip(req in arb_connect_request()) {
        let decoded = ConnectServerRequest::decode(&req.encode_to_vec()).expect("decode should succeed");
        prop_assert_eq!(decoded, req);
    }

    #[test]
    fn send_request_binary_round_trip(req in arb_send_request()) {
        let decoded = SendMessageRequest::decode(&req.encode_to_vec()).expect("decode should succeed");
        prop_assert_eq!(decoded.message.is_some(), req.message.is_some());
        prop_assert_eq!(decoded, req);
    }

    #[test]
    fn send_request_json_round_trip(req in arb_send_request(), pretty in any::<bool>(), defaults in any::<bool>()) {
        let opts = JsonWriteOptions { emit_default_values: defaults, use_proto_field_name: false };
        let text = req.to_json_string(opts, pretty);
        let decoded = SendMessageRequest::from_json_str(&text, JsonReadOptions { strict: true })
            .expect("decode should succeed");
        prop_assert_eq!(decoded, req);
    }

    #[test]
    fn proto_field_names_round_trip(msg in arb_message()) {
        let opts = JsonWriteOptions { emit_default_values: false, use_proto_field_name: true };
        let decoded = Message::from_json(&msg.to_json_with(opts)).expect("decode should succeed");
        prop_assert_eq!(decoded, msg);
    }

    #[test]
    fn equality_is_reflexive_and_symmetric(a in arb_send_request(), b in arb_send_request()) {
        prop_assert!(SendMessageRequest::equals(Some(&a), Some(&a)));
        prop_assert_eq!(
            SendMessageRequest::equals(Some(&a), Some(&b)),
            SendMessageRequest::equals(Some(&b), Some(&a))
        );
    }

    #[test]
    fn random_bytes_decode_no_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        for desc in registry::all() {
            let _ = binary::decode(desc, &bytes);
        }
    }

    #[test]
    fn random_json_text_no_panic(text in ".{0,128}") {
        let _ = SendMessageRequest::from_json_str(&text, JsonReadOptions::default());
    }

    #[test]
    fn unknown_fields_are_skipped_and_kept(
        msg in arb_message(),
        number in arb_unknown_field_number(),
        value in any::<u64>(),
    ) {
        let mut bytes = msg.encode_to_vec();
        wire::Tag::new(number, wire::WireType::Varint).encode(&mut bytes);
        wire::encode_varint(value, &mut bytes);

        let decoded = Message::decode(&bytes).expect("decode should succeed");
        prop_assert_eq!(&decoded, &msg);
        prop_assert_eq!(decoded.encode_to_vec(), bytes);
    }

    #[test]
    fn dynamic_and_typed_encodings_agree(msg in arb_message()) {
        let dynamic = DynamicMessage::build(
            &registry::MESSAGE,
            [("user_name", msg.user_name.as_str().into()), ("content", msg.content.as_str().into())],
        ).expect("build should succeed");
        prop_assert_eq!(binary::encode(&dynamic), msg.encode_to_vec());
        prop_assert!(msg.equals_dynamic(&dynamic));
    }
}
