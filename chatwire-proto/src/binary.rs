//! Binary (protobuf wire format) codec over [`DynamicMessage`].
//!
//! Encoding walks the descriptor in field-number order and omits default
//! strings and absent messages, so a defaulted message encodes to zero
//! bytes. Decoding skips field numbers the schema does not know and,
//! unless disabled, keeps their raw bytes for re-encoding.

use crate::dynamic::{DynamicMessage, FieldValue};
use crate::error::WireError;
use crate::schema::{FieldKind, MessageDescriptor};
use crate::wire::{self, RECURSION_LIMIT, Reader, Tag, WireType};

/// Options for binary decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryReadOptions {
    /// Keep the raw bytes of unknown fields on the decoded message.
    pub read_unknown_fields: bool,
}

impl Default for BinaryReadOptions {
    fn default() -> Self {
        Self {
            read_unknown_fields: true,
        }
    }
}

/// Options for binary encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryWriteOptions {
    /// Append retained unknown fields after the known ones.
    pub write_unknown_fields: bool,
}

impl Default for BinaryWriteOptions {
    fn default() -> Self {
        Self {
            write_unknown_fields: true,
        }
    }
}

/// Encodes a message with default options.
#[must_use]
pub fn encode(msg: &DynamicMessage) -> Vec<u8> {
    encode_with(msg, BinaryWriteOptions::default())
}

/// Encodes a message.
#[must_use]
pub fn encode_with(msg: &DynamicMessage, opts: BinaryWriteOptions) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(msg, opts));
    write_message(msg, opts, &mut buf);
    buf
}

/// Exact number of bytes [`encode_with`] produces.
#[must_use]
pub fn encoded_len(msg: &DynamicMessage, opts: BinaryWriteOptions) -> usize {
    let known: usize = msg
        .fields()
        .map(|(field, value)| match value {
            FieldValue::String(s) if !s.is_empty() => length_delimited_len(field.number, s.len()),
            FieldValue::Message(Some(nested)) => {
                length_delimited_len(field.number, encoded_len(nested, opts))
            }
            _ => 0,
        })
        .sum();
    if opts.write_unknown_fields {
        known + msg.unknown_fields().as_bytes().len()
    } else {
        known
    }
}

fn length_delimited_len(number: u32, payload_len: usize) -> usize {
    wire::varint_len(u64::from(number) << 3) + wire::varint_len(payload_len as u64) + payload_len
}

fn write_message(msg: &DynamicMessage, opts: BinaryWriteOptions, buf: &mut Vec<u8>) {
    for (field, value) in msg.fields() {
        match value {
            FieldValue::String(s) if !s.is_empty() => wire::encode_string(field.number, s, buf),
            FieldValue::Message(Some(nested)) => {
                Tag::new(field.number, WireType::LengthDelimited).encode(buf);
                wire::encode_varint(encoded_len(nested, opts) as u64, buf);
                write_message(nested, opts, buf);
            }
            _ => {}
        }
    }
    if opts.write_unknown_fields {
        buf.extend_from_slice(msg.unknown_fields().as_bytes());
    }
}

/// Decodes a message of type `descriptor` with default options.
///
/// # Errors
///
/// See [`decode_with`].
pub fn decode(descriptor: &'static MessageDescriptor, bytes: &[u8]) -> Result<DynamicMessage, WireError> {
    decode_with(descriptor, bytes, BinaryReadOptions::default())
}

/// Decodes a message of type `descriptor`. Fields missing from `bytes`
/// keep their defaults.
///
/// # Errors
///
/// Returns [`WireError::MalformedBinary`] for truncated or invalid tags and
/// lengths, [`WireError::InvalidUtf8`] for a bad string payload, and
/// [`WireError::KindMismatch`] when a known field arrives with the wrong
/// wire type or a nested payload does not parse. Input nested past
/// [`RECURSION_LIMIT`] is [`WireError::MalformedBinary`] at any depth.
pub fn decode_with(
    descriptor: &'static MessageDescriptor,
    bytes: &[u8],
    opts: BinaryReadOptions,
) -> Result<DynamicMessage, WireError> {
    let mut msg = DynamicMessage::new(descriptor);
    merge_at_depth(&mut msg, bytes, opts, 0)?;
    Ok(msg)
}

/// Merges an encoded message into `msg`: string fields present in `bytes`
/// overwrite, nested messages merge recursively.
///
/// On error `msg` may hold part of the input.
///
/// # Errors
///
/// See [`decode_with`].
pub fn merge(msg: &mut DynamicMessage, bytes: &[u8], opts: BinaryReadOptions) -> Result<(), WireError> {
    merge_at_depth(msg, bytes, opts, 0)
}

fn merge_at_depth(
    msg: &mut DynamicMessage,
    bytes: &[u8],
    opts: BinaryReadOptions,
    depth: usize,
) -> Result<(), WireError> {
    if depth > RECURSION_LIMIT {
        return Err(WireError::recursion_limit());
    }
    let descriptor = msg.descriptor();
    let mut reader = Reader::new(bytes);

    while !reader.is_empty() {
        let start = reader.position();
        let tag = reader.read_tag()?;

        let Some((index, field)) = descriptor.field_by_number(tag.field_number) else {
            reader.skip_field(tag, depth)?;
            tracing::trace!(
                type_name = descriptor.type_name,
                field_number = tag.field_number,
                wire_type = %tag.wire_type,
                "skipping unknown field"
            );
            if opts.read_unknown_fields {
                msg.unknown_fields_mut()
                    .push_raw(reader.span(start, reader.position()));
            }
            continue;
        };

        if tag.wire_type != WireType::LengthDelimited {
            return Err(WireError::kind_mismatch(
                field.name,
                format!(
                    "expected length-delimited {}, got {} wire type",
                    field.kind.name(),
                    tag.wire_type
                ),
            ));
        }
        let payload = reader.read_length_delimited()?;

        match (field.kind, msg.value_mut(index)) {
            (FieldKind::String, Some(slot)) => {
                *slot = FieldValue::String(wire::decode_string(field.name, payload)?);
            }
            (FieldKind::Message(nested_desc), Some(FieldValue::Message(slot))) => {
                let nested = slot.get_or_insert_with(|| DynamicMessage::new(nested_desc));
                merge_at_depth(nested, payload, opts, depth + 1).map_err(|e| match e {
                    WireError::MalformedBinary(_) if e.is_recursion_limit() => e,
                    WireError::MalformedBinary(detail) => WireError::kind_mismatch(
                        field.name,
                        format!("payload is not a valid {nested_desc}: {detail}"),
                    ),
                    other => other,
                })?;
            }
            _ => {}
        }
    }
    Ok(())
}
