//! Low-level protobuf wire primitives and the string field codec.
//!
//! Every field on the wire is a varint tag (`field_number << 3 | wire_type`)
//! followed by a payload whose shape depends on the wire type. The chat
//! schema only declares length-delimited fields (strings and nested
//! messages), but a decoder must still step over every other wire type so
//! that fields added by newer schemas can be skipped.

use serde_json::Value;

use crate::error::WireError;

/// Largest field number protobuf allows (`2^29 - 1`).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Maximum nesting depth for messages and groups.
pub const RECURSION_LIMIT: usize = 100;

/// Longest possible varint encoding of a `u64`.
const MAX_VARINT_LEN: usize = 10;

/// Payload shape announced by the low three bits of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    /// Base-128 varint.
    Varint,
    /// Eight little-endian bytes.
    Fixed64,
    /// Varint length followed by that many bytes.
    LengthDelimited,
    /// Start of a (deprecated) group.
    StartGroup,
    /// End of a (deprecated) group.
    EndGroup,
    /// Four little-endian bytes.
    Fixed32,
}

impl WireType {
    /// Parses the low three bits of a tag. Values 6 and 7 are invalid.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            3 => Some(Self::StartGroup),
            4 => Some(Self::EndGroup),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }

    /// The three-bit value written into a tag.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Varint => 0,
            Self::Fixed64 => 1,
            Self::LengthDelimited => 2,
            Self::StartGroup => 3,
            Self::EndGroup => 4,
            Self::Fixed32 => 5,
        }
    }

    /// Short lowercase name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Varint => "varint",
            Self::Fixed64 => "fixed64",
            Self::LengthDelimited => "length-delimited",
            Self::StartGroup => "start-group",
            Self::EndGroup => "end-group",
            Self::Fixed32 => "fixed32",
        }
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Field number, in `1..=MAX_FIELD_NUMBER`.
    pub field_number: u32,
    /// Payload shape.
    pub wire_type: WireType,
}

impl Tag {
    /// Creates a tag.
    #[must_use]
    pub const fn new(field_number: u32, wire_type: WireType) -> Self {
        Self {
            field_number,
            wire_type,
        }
    }

    /// Appends the varint form of this tag to `buf`.
    pub fn encode(self, buf: &mut Vec<u8>) {
        encode_varint(
            (u64::from(self.field_number) << 3) | u64::from(self.wire_type.bits()),
            buf,
        );
    }
}

/// Appends `value` as a base-128 varint.
#[allow(clippy::cast_possible_truncation)]
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    while value >= 0x80 {
        buf.push(((value as u8) & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Number of bytes `encode_varint` writes for `value`.
#[must_use]
pub const fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Appends a length-delimited field: tag, varint length, payload.
pub fn encode_length_delimited(field_number: u32, payload: &[u8], buf: &mut Vec<u8>) {
    Tag::new(field_number, WireType::LengthDelimited).encode(buf);
    encode_varint(payload.len() as u64, buf);
    buf.extend_from_slice(payload);
}

/// Cursor over an encoded message.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Starts reading at the beginning of `buf`.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Returns `true` once every byte has been consumed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Offset of the next unread byte.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Bytes between two earlier positions.
    #[must_use]
    pub fn span(&self, start: usize, end: usize) -> &'a [u8] {
        self.buf.get(start..end).unwrap_or_default()
    }

    /// Reads one varint.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::MalformedBinary`] if the input ends mid-varint or
    /// the varint does not fit in 64 bits.
    pub fn read_varint(&mut self) -> Result<u64, WireError> {
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_LEN {
            let Some(&byte) = self.buf.get(self.pos) else {
                return Err(WireError::malformed(format!(
                    "truncated varint at offset {}",
                    self.pos
                )));
            };
            self.pos += 1;
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(WireError::malformed("varint overflows 64 bits"));
            }
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte < 0x80 {
                return Ok(value);
            }
        }
        Err(WireError::malformed("varint longer than 10 bytes"))
    }

    /// Reads and validates a field tag.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::MalformedBinary`] for a truncated tag, field
    /// number 0 or above [`MAX_FIELD_NUMBER`], or wire type 6/7.
    pub fn read_tag(&mut self) -> Result<Tag, WireError> {
        let start = self.pos;
        let key = self.read_varint()?;
        #[allow(clippy::cast_possible_truncation)]
        let bits = (key & 0x7) as u8;
        let wire_type = WireType::from_bits(bits).ok_or_else(|| {
            WireError::malformed(format!("invalid wire type {bits} at offset {start}"))
        })?;
        let field_number = u32::try_from(key >> 3)
            .ok()
            .filter(|n| (1..=MAX_FIELD_NUMBER).contains(n))
            .ok_or_else(|| {
                WireError::malformed(format!(
                    "invalid field number {} at offset {start}",
                    key >> 3
                ))
            })?;
        Ok(Tag::new(field_number, wire_type))
    }

    /// Reads exactly `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::MalformedBinary`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        let remaining = self.buf.len() - self.pos.min(self.buf.len());
        if len > remaining {
            return Err(WireError::malformed(format!(
                "payload needs {len} bytes but only {remaining} remain"
            )));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads a varint length prefix followed by that many bytes.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::MalformedBinary`] on a bad or oversized length.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.read_varint()?;
        let len = usize::try_from(len)
            .map_err(|_| WireError::malformed(format!("length {len} does not fit in memory")))?;
        self.read_bytes(len)
    }

    /// Steps over the payload of a field whose tag was just read.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::MalformedBinary`] on truncation, a stray
    /// end-group, a mismatched or missing end-group, or groups nested deeper
    /// than [`RECURSION_LIMIT`].
    pub fn skip_field(&mut self, tag: Tag, depth: usize) -> Result<(), WireError> {
        match tag.wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed64 => {
                self.read_bytes(8)?;
            }
            WireType::LengthDelimited => {
                self.read_length_delimited()?;
            }
            WireType::Fixed32 => {
                self.read_bytes(4)?;
            }
            WireType::StartGroup => {
                if depth >= RECURSION_LIMIT {
                    return Err(WireError::recursion_limit());
                }
                loop {
                    if self.is_empty() {
                        return Err(WireError::malformed(format!(
                            "unterminated group for field {}",
                            tag.field_number
                        )));
                    }
                    let inner = self.read_tag()?;
                    if inner.wire_type == WireType::EndGroup {
                        if inner.field_number != tag.field_number {
                            return Err(WireError::malformed(format!(
                                "group {} closed by end-group {}",
                                tag.field_number, inner.field_number
                            )));
                        }
                        break;
                    }
                    self.skip_field(inner, depth + 1)?;
                }
            }
            WireType::EndGroup => {
                return Err(WireError::malformed(format!(
                    "unexpected end-group for field {}",
                    tag.field_number
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// String field codec
// ---------------------------------------------------------------------------

/// Appends a string field. Callers skip empty strings (proto3 default).
pub fn encode_string(field_number: u32, value: &str, buf: &mut Vec<u8>) {
    encode_length_delimited(field_number, value.as_bytes(), buf);
}

/// Decodes a string field payload.
///
/// # Errors
///
/// Returns [`WireError::InvalidUtf8`] naming `field` if the payload is not
/// valid UTF-8.
pub fn decode_string(field: &'static str, payload: &[u8]) -> Result<String, WireError> {
    std::str::from_utf8(payload)
        .map(str::to_owned)
        .map_err(|_| WireError::InvalidUtf8 { field })
}

/// JSON form of a string field.
#[must_use]
pub fn string_to_json(value: &str) -> Value {
    Value::String(value.to_owned())
}

/// Reads a string field from a JSON value. `null` yields the default `""`.
///
/// # Errors
///
/// Returns [`WireError::KindMismatch`] for any non-string, non-null value.
pub fn string_from_json(field: &'static str, value: &Value) -> Result<String, WireError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        other => Err(WireError::kind_mismatch(
            field,
            format!("expected string, got {}", json_type_name(other)),
        )),
    }
}

/// Name of a JSON value's type, for diagnostics.
#[must_use]
pub const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
