//! Wire schema and codecs for the chat service.
//!
//! Three message types (`ConnectServerRequest`, `Message`,
//! `SendMessageRequest`) are described by static descriptors in
//! [`registry`]. The [`binary`] and [`json`] codecs and the [`equality`]
//! engine interpret those descriptors over [`dynamic::DynamicMessage`];
//! the typed structs in [`message`] convert to and from it.

pub mod binary;
pub mod dynamic;
pub mod equality;
pub mod error;
pub mod json;
pub mod message;
pub mod registry;
pub mod schema;
pub mod service;
pub mod wire;

pub use dynamic::{BuildError, DynamicMessage, FieldValue, UnknownFields};
pub use error::WireError;
pub use message::{ConnectServerRequest, Message, SendMessageRequest, ValidationError, WireMessage};
