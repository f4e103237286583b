//! The `chat.Chat` service: which messages each RPC exchanges.
//!
//! Transports implement the calls; this module only names them so that
//! both ends agree on paths and message types.

use crate::registry::{CONNECT_SERVER_REQUEST, MESSAGE, SEND_MESSAGE_REQUEST};
use crate::schema::MessageDescriptor;

/// Call shape of an RPC method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// One request, one response.
    Unary,
    /// One request, a stream of responses.
    ServerStreaming,
}

/// One RPC method.
#[derive(Debug)]
pub struct MethodDescriptor {
    /// Method name, e.g. `SendMessage`.
    pub name: &'static str,
    /// Request type.
    pub input: &'static MessageDescriptor,
    /// Response type (per stream item for streaming methods).
    pub output: &'static MessageDescriptor,
    /// Call shape.
    pub kind: MethodKind,
}

/// An RPC service.
#[derive(Debug)]
pub struct ServiceDescriptor {
    /// Fully qualified service name.
    pub type_name: &'static str,
    /// Methods in declaration order.
    pub methods: &'static [MethodDescriptor],
}

impl ServiceDescriptor {
    /// Finds a method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&'static MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Request path of a method: `/<service>/<method>`.
    #[must_use]
    pub fn path(&self, method: &MethodDescriptor) -> String {
        format!("/{}/{}", self.type_name, method.name)
    }

    /// Resolves a request path back to its method.
    #[must_use]
    pub fn method_for_path(&self, path: &str) -> Option<&'static MethodDescriptor> {
        let rest = path.strip_prefix('/')?.strip_prefix(self.type_name)?;
        self.method(rest.strip_prefix('/')?)
    }
}

/// `chat.Chat`.
pub static CHAT: ServiceDescriptor = ServiceDescriptor {
    type_name: "chat.Chat",
    methods: &[
        MethodDescriptor {
            name: "ConnectServer",
            input: &CONNECT_SERVER_REQUEST,
            output: &MESSAGE,
            kind: MethodKind::ServerStreaming,
        },
        MethodDescriptor {
            name: "SendMessage",
            input: &SEND_MESSAGE_REQUEST,
            output: &MESSAGE,
            kind: MethodKind::Unary,
        },
    ],
};
