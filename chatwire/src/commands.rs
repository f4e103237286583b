//! Subcommand implementations.
//!
//! Every command works on [`DynamicMessage`](chatwire_proto::DynamicMessage) resolved through the schema
//! registry, so new message types need no changes here.

use std::fmt::Write as _;
use std::io::Read;

use chatwire_proto::schema::{FieldKind, MessageDescriptor};
use chatwire_proto::service::{self, MethodKind};
use chatwire_proto::wire::{Reader, WireType};
use chatwire_proto::{WireError, binary, equality, json, registry};

use crate::config::{Command, ToolConfig};

/// Errors reported by a subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The requested message type is not registered.
    #[error("unknown message type `{0}` (run `chatwire types` to list them)")]
    UnknownType(String),

    /// Binary input was not valid hex.
    #[error("invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The payload could not be decoded.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Reading stdin failed.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of running a subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Text to print on stdout.
    pub output: String,
    /// `false` when the command ran but reports a negative result
    /// (e.g. `compare` found a difference).
    pub success: bool,
}

impl Report {
    fn ok(output: String) -> Self {
        Self {
            output,
            success: true,
        }
    }
}

/// Runs `command`, reading omitted or `-` inputs from `stdin`.
///
/// # Errors
///
/// Returns [`CommandError`] if the input cannot be read or decoded, or the
/// message type is unknown.
pub fn run(command: &Command, config: &ToolConfig, stdin: impl Read) -> Result<Report, CommandError> {
    match command {
        Command::Encode { type_name, input } => {
            let text = read_input(input.as_deref(), stdin)?;
            encode(type_name, &text, config).map(Report::ok)
        }
        Command::Decode { type_name, input } => {
            let text = read_input(input.as_deref(), stdin)?;
            decode(type_name, &text, config).map(Report::ok)
        }
        Command::Compare {
            type_name,
            left,
            right,
        } => {
            let right = read_input(right.as_deref(), stdin)?;
            let equal = compare(type_name, left, &right, config)?;
            Ok(Report {
                output: if equal { "equal" } else { "not equal" }.to_string(),
                success: equal,
            })
        }
        Command::Inspect { input } => {
            let text = read_input(input.as_deref(), stdin)?;
            inspect(&text).map(Report::ok)
        }
        Command::Types => Ok(Report::ok(types())),
    }
}

/// Encodes JSON text as hex-encoded binary.
///
/// # Errors
///
/// Returns [`CommandError`] for an unknown type or undecodable JSON.
pub fn encode(type_name: &str, json_text: &str, config: &ToolConfig) -> Result<String, CommandError> {
    let descriptor = resolve_type(type_name)?;
    let msg = json::from_json_str(descriptor, json_text, config.json_read)?;
    let bytes = binary::encode(&msg);
    tracing::debug!(type_name = descriptor.type_name, len = bytes.len(), "encoded message");
    Ok(hex::encode(bytes))
}

/// Decodes hex-encoded binary into JSON text.
///
/// # Errors
///
/// Returns [`CommandError`] for an unknown type, invalid hex, or an
/// undecodable payload.
pub fn decode(type_name: &str, hex_text: &str, config: &ToolConfig) -> Result<String, CommandError> {
    let descriptor = resolve_type(type_name)?;
    let bytes = decode_hex(hex_text)?;
    let msg = binary::decode_with(descriptor, &bytes, config.binary_read)?;
    if !msg.unknown_fields().is_empty() {
        tracing::info!(
            type_name = descriptor.type_name,
            len = msg.unknown_fields().as_bytes().len(),
            "payload carries fields unknown to this schema"
        );
    }
    Ok(json::to_json_string(&msg, config.json_write, config.pretty))
}

/// Compares two JSON messages with the equality engine.
///
/// # Errors
///
/// Returns [`CommandError`] for an unknown type or undecodable JSON.
pub fn compare(type_name: &str, left: &str, right: &str, config: &ToolConfig) -> Result<bool, CommandError> {
    let descriptor = resolve_type(type_name)?;
    let left = json::from_json_str(descriptor, left, config.json_read)?;
    let right = json::from_json_str(descriptor, right, config.json_read)?;
    Ok(equality::equals(Some(&left), Some(&right)))
}

/// Lists the top-level fields of a payload without interpreting them
/// against a schema.
///
/// # Errors
///
/// Returns [`CommandError`] for invalid hex or a malformed payload.
pub fn inspect(hex_text: &str) -> Result<String, CommandError> {
    let bytes = decode_hex(hex_text)?;
    let mut reader = Reader::new(&bytes);
    let mut out = String::new();

    while !reader.is_empty() {
        let start = reader.position();
        let tag = reader.read_tag()?;
        let value_start = reader.position();
        let description = match tag.wire_type {
            WireType::Varint => reader.read_varint()?.to_string(),
            WireType::LengthDelimited => {
                let payload = reader.read_length_delimited()?;
                match std::str::from_utf8(payload) {
                    Ok(text) => format!("{} bytes {text:?}", payload.len()),
                    Err(_) => format!("{} bytes 0x{}", payload.len(), hex::encode(payload)),
                }
            }
            WireType::Fixed64 | WireType::Fixed32 | WireType::StartGroup | WireType::EndGroup => {
                reader.skip_field(tag, 0)?;
                format!("0x{}", hex::encode(reader.span(value_start, reader.position())))
            }
        };
        let _ = writeln!(
            out,
            "@{start:<4} field {:<3} {:<16} {description}",
            tag.field_number,
            tag.wire_type.name()
        );
    }
    Ok(out)
}

/// Describes every registered message type and the chat service.
#[must_use]
pub fn types() -> String {
    let mut out = String::new();
    for descriptor in registry::all() {
        describe_message(&mut out, descriptor);
    }
    let chat = &service::CHAT;
    let _ = writeln!(out, "service {}", chat.type_name);
    for method in chat.methods {
        let stream = match method.kind {
            MethodKind::Unary => "",
            MethodKind::ServerStreaming => "stream ",
        };
        let _ = writeln!(
            out,
            "  rpc {}({}) returns ({stream}{})  {}",
            method.name,
            method.input.type_name,
            method.output.type_name,
            chat.path(method)
        );
    }
    out
}

fn describe_message(out: &mut String, descriptor: &MessageDescriptor) {
    let _ = writeln!(out, "message {descriptor}");
    for field in descriptor.fields {
        let kind = match field.kind {
            FieldKind::String => "string",
            FieldKind::Message(nested) => nested.type_name,
        };
        let _ = writeln!(
            out,
            "  {} = {}  {kind}  (json: {})",
            field.name, field.number, field.json_name
        );
    }
}

fn resolve_type(type_name: &str) -> Result<&'static MessageDescriptor, CommandError> {
    registry::find(type_name).ok_or_else(|| CommandError::UnknownType(type_name.to_owned()))
}

fn decode_hex(text: &str) -> Result<Vec<u8>, CommandError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(hex::decode(compact)?)
}

fn read_input(arg: Option<&str>, mut stdin: impl Read) -> Result<String, CommandError> {
    match arg {
        Some(text) if text != "-" => Ok(text.to_owned()),
        _ => {
            let mut buf = String::new();
            stdin.read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
