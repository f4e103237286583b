//! The chat schema: one static descriptor per message type.
//!
//! Field numbers below are the wire contract. Field 1 of `chat.Message` is
//! deliberately unused; never assign it or renumber an existing field.

use crate::schema::{FieldDescriptor, FieldKind, MessageDescriptor};

/// `chat.ConnectServerRequest.user_name`
pub const CONNECT_SERVER_REQUEST_USER_NAME: u32 = 1;
/// `chat.Message.user_name`
pub const MESSAGE_USER_NAME: u32 = 2;
/// `chat.Message.content`
pub const MESSAGE_CONTENT: u32 = 3;
/// `chat.SendMessageRequest.message`
pub const SEND_MESSAGE_REQUEST_MESSAGE: u32 = 1;

/// `chat.ConnectServerRequest`: a client announcing itself.
pub static CONNECT_SERVER_REQUEST: MessageDescriptor = MessageDescriptor {
    type_name: "chat.ConnectServerRequest",
    fields: &[FieldDescriptor {
        number: CONNECT_SERVER_REQUEST_USER_NAME,
        name: "user_name",
        json_name: "userName",
        kind: FieldKind::String,
    }],
};

/// `chat.Message`: one chat line.
pub static MESSAGE: MessageDescriptor = MessageDescriptor {
    type_name: "chat.Message",
    fields: &[
        FieldDescriptor {
            number: MESSAGE_USER_NAME,
            name: "user_name",
            json_name: "userName",
            kind: FieldKind::String,
        },
        FieldDescriptor {
            number: MESSAGE_CONTENT,
            name: "content",
            json_name: "content",
            kind: FieldKind::String,
        },
    ],
};

/// `chat.SendMessageRequest`: wraps a [`MESSAGE`] for delivery.
pub static SEND_MESSAGE_REQUEST: MessageDescriptor = MessageDescriptor {
    type_name: "chat.SendMessageRequest",
    fields: &[FieldDescriptor {
        number: SEND_MESSAGE_REQUEST_MESSAGE,
        name: "message",
        json_name: "message",
        kind: FieldKind::Message(&MESSAGE),
    }],
};

static ALL: [&MessageDescriptor; 3] = [&CONNECT_SERVER_REQUEST, &MESSAGE, &SEND_MESSAGE_REQUEST];

/// Every registered message type.
#[must_use]
pub fn all() -> &'static [&'static MessageDescriptor] {
    &ALL
}

/// Resolves a descriptor by fully qualified (`chat.Message`) or short
/// (`Message`) type name.
#[must_use]
pub fn find(type_name: &str) -> Option<&'static MessageDescriptor> {
    ALL.iter()
        .copied()
        .find(|d| d.type_name == type_name || d.short_name() == type_name)
}
