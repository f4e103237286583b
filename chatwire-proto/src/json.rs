//! JSON codec over [`DynamicMessage`].
//!
//! Messages map to JSON objects keyed by each field's camelCase JSON name.
//! Default strings are omitted unless
//! [`JsonWriteOptions::emit_default_values`] is set; absent messages are
//! never written. On input both the JSON name and the declared name are
//! accepted.

use serde_json::{Map, Value};

use crate::dynamic::{DynamicMessage, FieldValue};
use crate::error::WireError;
use crate::schema::{FieldKind, MessageDescriptor};
use crate::wire::{self, json_type_name};

/// Options for JSON encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonWriteOptions {
    /// Write default-valued string fields as `""` instead of omitting them.
    pub emit_default_values: bool,
    /// Key fields by their declared name (`user_name`) instead of the JSON
    /// name (`userName`).
    pub use_proto_field_name: bool,
}

/// Options for JSON decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonReadOptions {
    /// Reject keys the schema does not declare instead of ignoring them.
    pub strict: bool,
}

/// Converts a message to a JSON value with default options.
#[must_use]
pub fn to_json(msg: &DynamicMessage) -> Value {
    to_json_with(msg, JsonWriteOptions::default())
}

/// Converts a message to a JSON object.
#[must_use]
pub fn to_json_with(msg: &DynamicMessage, opts: JsonWriteOptions) -> Value {
    Value::Object(write_object(msg, opts))
}

/// Serializes a message to a JSON string, compact or pretty-printed.
#[must_use]
pub fn to_json_string(msg: &DynamicMessage, opts: JsonWriteOptions, pretty: bool) -> String {
    let value = to_json_with(msg, opts);
    if pretty {
        format!("{value:#}")
    } else {
        value.to_string()
    }
}

fn write_object(msg: &DynamicMessage, opts: JsonWriteOptions) -> Map<String, Value> {
    let mut map = Map::new();
    for (field, value) in msg.fields() {
        let key = if opts.use_proto_field_name {
            field.name
        } else {
            field.json_name
        };
        match value {
            FieldValue::String(s) if !s.is_empty() || opts.emit_default_values => {
                map.insert(key.to_owned(), wire::string_to_json(s));
            }
            FieldValue::Message(Some(nested)) => {
                map.insert(key.to_owned(), Value::Object(write_object(nested, opts)));
            }
            _ => {}
        }
    }
    map
}

/// Decodes a message of type `descriptor` from a JSON value with default
/// options.
///
/// # Errors
///
/// See [`from_json_with`].
pub fn from_json(descriptor: &'static MessageDescriptor, value: &Value) -> Result<DynamicMessage, WireError> {
    from_json_with(descriptor, value, JsonReadOptions::default())
}

/// Decodes a message of type `descriptor` from a JSON value.
///
/// # Errors
///
/// Returns [`WireError::MalformedJson`] if `value` is not an object,
/// [`WireError::KindMismatch`] for a field value of the wrong JSON type,
/// [`WireError::DuplicateField`] when a field appears under both of its
/// names, and [`WireError::StrictUnknownField`] for an undeclared key in
/// strict mode.
pub fn from_json_with(
    descriptor: &'static MessageDescriptor,
    value: &Value,
    opts: JsonReadOptions,
) -> Result<DynamicMessage, WireError> {
    let Value::Object(map) = value else {
        return Err(WireError::MalformedJson(format!(
            "expected object for {descriptor}, got {}",
            json_type_name(value)
        )));
    };
    read_object(descriptor, map, opts)
}

/// Parses and decodes a JSON string.
///
/// # Errors
///
/// Returns [`WireError::MalformedJson`] on a syntax error, otherwise see
/// [`from_json_with`].
pub fn from_json_str(
    descriptor: &'static MessageDescriptor,
    json: &str,
    opts: JsonReadOptions,
) -> Result<DynamicMessage, WireError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| WireError::MalformedJson(e.to_string()))?;
    from_json_with(descriptor, &value, opts)
}

fn read_object(
    descriptor: &'static MessageDescriptor,
    map: &Map<String, Value>,
    opts: JsonReadOptions,
) -> Result<DynamicMessage, WireError> {
    let mut msg = DynamicMessage::new(descriptor);
    let mut seen = vec![false; descriptor.fields.len()];

    for (key, value) in map {
        let Some((index, field)) = descriptor.field_by_json_key(key) else {
            if opts.strict {
                tracing::debug!(type_name = descriptor.type_name, key = %key, "rejecting unknown JSON key");
                return Err(WireError::StrictUnknownField(key.clone()));
            }
            tracing::trace!(type_name = descriptor.type_name, key = %key, "ignoring unknown JSON key");
            continue;
        };
        if std::mem::replace(&mut seen[index], true) {
            return Err(WireError::DuplicateField(field.name));
        }

        let decoded = match field.kind {
            FieldKind::String => FieldValue::String(wire::string_from_json(field.name, value)?),
            FieldKind::Message(nested_desc) => match value {
                Value::Null => FieldValue::Message(None),
                Value::Object(nested) => {
                    FieldValue::Message(Some(read_object(nested_desc, nested, opts)?))
                }
                other => {
                    return Err(WireError::kind_mismatch(
                        field.name,
                        format!("expected object, got {}", json_type_name(other)),
                    ));
                }
            },
        };
        if let Some(slot) = msg.value_mut(index) {
            *slot = decoded;
        }
    }
    Ok(msg)
}
