//! Typed chat messages.
//!
//! Each struct mirrors one descriptor in [`crate::registry`] and gets its
//! binary, JSON and equality behavior from the generic codecs through the
//! [`WireMessage`] trait. Struct fields hold the decoded values directly;
//! an unset string is `""` and an unset nested message is `None`.

use serde_json::Value;

use crate::binary::{self, BinaryReadOptions, BinaryWriteOptions};
use crate::dynamic::{DynamicMessage, FieldValue, UnknownFields};
use crate::equality;
use crate::error::WireError;
use crate::json::{self, JsonReadOptions, JsonWriteOptions};
use crate::registry;
use crate::schema::MessageDescriptor;

/// A message type backed by a static descriptor.
///
/// Implementors only convert to and from [`DynamicMessage`]; every codec
/// operation is provided.
pub trait WireMessage: Sized + Clone + Default + std::fmt::Debug {
    /// Schema of this type.
    fn descriptor() -> &'static MessageDescriptor;

    /// Generic form of this value.
    fn to_dynamic(&self) -> DynamicMessage;

    /// Typed form of a generic value of the same descriptor. Fields the
    /// type does not know are left at their defaults.
    fn from_dynamic(msg: DynamicMessage) -> Self;

    /// Binary encoding with default options.
    fn encode_to_vec(&self) -> Vec<u8> {
        binary::encode(&self.to_dynamic())
    }

    /// Binary encoding.
    fn encode_with(&self, opts: BinaryWriteOptions) -> Vec<u8> {
        binary::encode_with(&self.to_dynamic(), opts)
    }

    /// Size of the binary encoding with default options.
    fn encoded_len(&self) -> usize {
        binary::encoded_len(&self.to_dynamic(), BinaryWriteOptions::default())
    }

    /// Decodes from binary with default options.
    ///
    /// # Errors
    ///
    /// See [`binary::decode_with`].
    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        Self::decode_with(bytes, BinaryReadOptions::default())
    }

    /// Decodes from binary.
    ///
    /// # Errors
    ///
    /// See [`binary::decode_with`].
    fn decode_with(bytes: &[u8], opts: BinaryReadOptions) -> Result<Self, WireError> {
        binary::decode_with(Self::descriptor(), bytes, opts).map(Self::from_dynamic)
    }

    /// JSON object with default options.
    fn to_json(&self) -> Value {
        json::to_json(&self.to_dynamic())
    }

    /// JSON object.
    fn to_json_with(&self, opts: JsonWriteOptions) -> Value {
        json::to_json_with(&self.to_dynamic(), opts)
    }

    /// JSON text, compact or pretty-printed.
    fn to_json_string(&self, opts: JsonWriteOptions, pretty: bool) -> String {
        json::to_json_string(&self.to_dynamic(), opts, pretty)
    }

    /// Decodes from a JSON value with default options.
    ///
    /// # Errors
    ///
    /// See [`json::from_json_with`].
    fn from_json(value: &Value) -> Result<Self, WireError> {
        Self::from_json_with(value, JsonReadOptions::default())
    }

    /// Decodes from a JSON value.
    ///
    /// # Errors
    ///
    /// See [`json::from_json_with`].
    fn from_json_with(value: &Value, opts: JsonReadOptions) -> Result<Self, WireError> {
        json::from_json_with(Self::descriptor(), value, opts).map(Self::from_dynamic)
    }

    /// Decodes from JSON text.
    ///
    /// # Errors
    ///
    /// See [`json::from_json_str`].
    fn from_json_str(text: &str, opts: JsonReadOptions) -> Result<Self, WireError> {
        json::from_json_str(Self::descriptor(), text, opts).map(Self::from_dynamic)
    }

    /// Absence-aware structural equality.
    fn equals(a: Option<&Self>, b: Option<&Self>) -> bool {
        let a = a.map(Self::to_dynamic);
        let b = b.map(Self::to_dynamic);
        equality::equals(a.as_ref(), b.as_ref())
    }

    /// Compares against a generic value.
    fn equals_dynamic(&self, other: &DynamicMessage) -> bool {
        equality::equals(Some(&self.to_dynamic()), Some(other))
    }
}

/// Error returned when a decoded request cannot be acted on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// `ConnectServerRequest.user_name` is empty; connections are keyed by it.
    #[error("user name is empty")]
    EmptyUserName,
    /// `SendMessageRequest.message` is absent.
    #[error("request carries no message")]
    MissingMessage,
}

// ---------------------------------------------------------------------------
// chat.ConnectServerRequest
// ---------------------------------------------------------------------------

/// A client announcing itself to the server.
#[derive(Debug, Clone, Default)]
pub struct ConnectServerRequest {
    /// Name the connection is registered under.
    pub user_name: String,
    /// Fields from newer schemas, re-emitted on encode.
    pub unknown_fields: UnknownFields,
}

impl ConnectServerRequest {
    /// Creates a request for `user_name`.
    #[must_use]
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            unknown_fields: UnknownFields::default(),
        }
    }

    /// Checks that the request names a user.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyUserName`] if `user_name` is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_name.is_empty() {
            return Err(ValidationError::EmptyUserName);
        }
        Ok(())
    }
}

impl WireMessage for ConnectServerRequest {
    fn descriptor() -> &'static MessageDescriptor {
        &registry::CONNECT_SERVER_REQUEST
    }

    fn to_dynamic(&self) -> DynamicMessage {
        let mut msg = DynamicMessage::new(Self::descriptor());
        msg.put(
            registry::CONNECT_SERVER_REQUEST_USER_NAME,
            FieldValue::String(self.user_name.clone()),
        );
        *msg.unknown_fields_mut() = self.unknown_fields.clone();
        msg
    }

    fn from_dynamic(mut msg: DynamicMessage) -> Self {
        Self {
            user_name: msg.take_string(registry::CONNECT_SERVER_REQUEST_USER_NAME),
            unknown_fields: std::mem::take(msg.unknown_fields_mut()),
        }
    }
}

impl PartialEq for ConnectServerRequest {
    fn eq(&self, other: &Self) -> bool {
        Self::equals(Some(self), Some(other))
    }
}

impl Eq for ConnectServerRequest {}

// ---------------------------------------------------------------------------
// chat.Message
// ---------------------------------------------------------------------------

/// One chat line.
#[derive(Debug, Clone, Default)]
pub struct Message {
    /// Author of the line.
    pub user_name: String,
    /// Text of the line.
    pub content: String,
    /// Fields from newer schemas, re-emitted on encode.
    pub unknown_fields: UnknownFields,
}

impl Message {
    /// Creates a message from `user_name` with `content`.
    #[must_use]
    pub fn new(user_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            content: content.into(),
            unknown_fields: UnknownFields::default(),
        }
    }
}

impl WireMessage for Message {
    fn descriptor() -> &'static MessageDescriptor {
        &registry::MESSAGE
    }

    fn to_dynamic(&self) -> DynamicMessage {
        let mut msg = DynamicMessage::new(Self::descriptor());
        msg.put(registry::MESSAGE_USER_NAME, FieldValue::String(self.user_name.clone()));
        msg.put(registry::MESSAGE_CONTENT, FieldValue::String(self.content.clone()));
        *msg.unknown_fields_mut() = self.unknown_fields.clone();
        msg
    }

    fn from_dynamic(mut msg: DynamicMessage) -> Self {
        Self {
            user_name: msg.take_string(registry::MESSAGE_USER_NAME),
            content: msg.take_string(registry::MESSAGE_CONTENT),
            unknown_fields: std::mem::take(msg.unknown_fields_mut()),
        }
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        Self::equals(Some(self), Some(other))
    }
}

impl Eq for Message {}

// ---------------------------------------------------------------------------
// chat.SendMessageRequest
// ---------------------------------------------------------------------------

/// Request to deliver a [`Message`] to the other connected clients.
#[derive(Debug, Clone, Default)]
pub struct SendMessageRequest {
    /// The message to deliver. `None` is distinct from `Some(Message::default())`.
    pub message: Option<Message>,
    /// Fields from newer schemas, re-emitted on encode.
    pub unknown_fields: UnknownFields,
}

impl SendMessageRequest {
    /// Creates a request carrying `message`.
    #[must_use]
    pub fn new(message: Message) -> Self {
        Self {
            message: Some(message),
            unknown_fields: UnknownFields::default(),
        }
    }

    /// Returns the carried message.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingMessage`] if `message` is absent.
    pub fn validate(&self) -> Result<&Message, ValidationError> {
        self.message.as_ref().ok_or(ValidationError::MissingMessage)
    }
}

impl WireMessage for SendMessageRequest {
    fn descriptor() -> &'static MessageDescriptor {
        &registry::SEND_MESSAGE_REQUEST
    }

    fn to_dynamic(&self) -> DynamicMessage {
        let mut msg = DynamicMessage::new(Self::descriptor());
        msg.put(
            registry::SEND_MESSAGE_REQUEST_MESSAGE,
            FieldValue::Message(self.message.as_ref().map(Message::to_dynamic)),
        );
        *msg.unknown_fields_mut() = self.unknown_fields.clone();
        msg
    }

    fn from_dynamic(mut msg: DynamicMessage) -> Self {
        Self {
            message: msg
                .take_message(registry::SEND_MESSAGE_REQUEST_MESSAGE)
                .map(Message::from_dynamic),
            unknown_fields: std::mem::take(msg.unknown_fields_mut()),
        }
    }
}

impl PartialEq for SendMessageRequest {
    fn eq(&self, other: &Self) -> bool {
        Self::equals(Some(self), Some(other))
    }
}

impl Eq for SendMessageRequest {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_are_empty_and_absent() {
        let req = ConnectServerRequest::default();
        assert_eq!(req.user_name, "");
        let msg = Message::default();
        assert_eq!((msg.user_name.as_str(), msg.content.as_str()), ("", ""));
        assert!(SendMessageRequest::default().message.is_none());
    }

    #[test]
    fn connect_request_scenario() {
        let req = ConnectServerRequest::new("alice");
        let bytes = req.encode_to_vec();
        assert_eq!(bytes, [0x0a, 0x05, b'a', b'l', b'i', b'c', b'e']);
        assert_eq!(req.encoded_len(), bytes.len());
        assert_eq!(req.to_json(), json!({"userName": "alice"}));

        assert_eq!(ConnectServerRequest::decode(&bytes).unwrap(), req);
        assert_eq!(ConnectServerRequest::from_json(&json!({"userName": "alice"})).unwrap(), req);
    }

    #[test]
    fn send_request_round_trips() {
        let req = SendMessageRequest::new(Message::new("bob", "héllo 🎉"));
        let decoded = SendMessageRequest::decode(&req.encode_to_vec()).unwrap();
        assert_eq!(decoded, req);
        let text = req.to_json_string(JsonWriteOptions::default(), false);
        assert_eq!(
            SendMessageRequest::from_json_str(&text, JsonReadOptions::default()).unwrap(),
            req
        );
    }

    #[test]
    fn absent_message_differs_from_default_message() {
        let absent = SendMessageRequest::default();
        let empty = SendMessageRequest::new(Message::default());
        assert_ne!(absent, empty);
        assert!(absent.encode_to_vec().is_empty());
        assert_eq!(empty.encode_to_vec(), [0x0a, 0x00]);
    }

    #[test]
    fn equals_handles_absence() {
        let m = Message::new("a", "b");
        assert!(Message::equals(None, None));
        assert!(!Message::equals(Some(&m), None));
        assert!(Message::equals(Some(&m), Some(&m.clone())));
    }

    #[test]
    fn equality_ignores_unknown_fields() {
        let mut bytes = Message::new("a", "b").encode_to_vec();
        bytes.extend_from_slice(&[0x50, 0x07]); // field 10, varint 7
        let decoded = Message::decode(&bytes).unwrap();
        assert!(!decoded.unknown_fields.is_empty());
        assert_eq!(decoded, Message::new("a", "b"));
        assert_eq!(decoded.encode_to_vec(), bytes);
    }

    #[test]
    fn typed_matches_dynamic() {
        let typed = Message::new("u", "c");
        let dynamic = DynamicMessage::build(
            &registry::MESSAGE,
            [("userName", "u".into()), ("content", "c".into())],
        )
        .unwrap();
        assert!(typed.equals_dynamic(&dynamic));
        assert!(!Message::default().equals_dynamic(&dynamic));
        assert_eq!(Message::from_dynamic(dynamic), typed);
    }

    #[test]
    fn validate_connect_request() {
        assert_eq!(
            ConnectServerRequest::default().validate(),
            Err(ValidationError::EmptyUserName)
        );
        assert!(ConnectServerRequest::new("x").validate().is_ok());
    }

    #[test]
    fn validate_send_request() {
        assert_eq!(
            SendMessageRequest::default().validate(),
            Err(ValidationError::MissingMessage)
        );
        let req = SendMessageRequest::new(Message::new("u", "c"));
        assert_eq!(req.validate().unwrap().content, "c");
    }
}
