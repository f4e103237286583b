//! Schema-driven message instances and construction with defaults.
//!
//! [`DynamicMessage`] stores one [`FieldValue`] per descriptor field, in
//! descriptor order. It is the generic representation every codec and the
//! equality engine operate on; the typed structs in [`crate::message`]
//! convert to and from it.

use crate::schema::{FieldDescriptor, FieldKind, MessageDescriptor};

/// Error returned when a message cannot be built from a partial field map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// The message type declares no field with this name.
    #[error("{type_name} has no field `{field}`")]
    UnknownField {
        /// Message type being built.
        type_name: &'static str,
        /// Name that was supplied.
        field: String,
    },

    /// A string was supplied for a message field or vice versa.
    #[error("field `{field}` expects a {expected} value, got {found}")]
    KindMismatch {
        /// Declared field name.
        field: &'static str,
        /// Kind the schema declares.
        expected: &'static str,
        /// Kind that was supplied.
        found: &'static str,
    },

    /// A nested message of the wrong type was supplied.
    #[error("field `{field}` expects {expected}, got {found}")]
    TypeMismatch {
        /// Declared field name.
        field: &'static str,
        /// Type name the schema declares.
        expected: &'static str,
        /// Type name that was supplied.
        found: &'static str,
    },
}

/// Current value of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// String scalar. `""` is the default.
    String(String),
    /// Embedded message. `None` means absent, which differs from a present
    /// but default-valued message.
    Message(Option<DynamicMessage>),
}

impl FieldValue {
    /// Default value for a field kind: `""` or absent.
    #[must_use]
    pub const fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::String => Self::String(String::new()),
            FieldKind::Message(_) => Self::Message(None),
        }
    }

    /// Whether this value is the default, i.e. would be omitted on the wire.
    #[must_use]
    pub fn is_default(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::Message(m) => m.is_none(),
        }
    }

    /// Kind name of the value.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Message(_) => "message",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<DynamicMessage> for FieldValue {
    fn from(value: DynamicMessage) -> Self {
        Self::Message(Some(value))
    }
}

/// Raw bytes of binary fields the schema does not declare, kept so that a
/// message relayed through an older decoder does not lose them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownFields(Vec<u8>);

impl UnknownFields {
    /// Returns `true` if nothing was retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Retained bytes, each field still carrying its original tag.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Appends one raw field (tag included).
    pub fn push_raw(&mut self, field: &[u8]) {
        self.0.extend_from_slice(field);
    }

    /// Drops everything retained.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// A message instance driven entirely by its descriptor.
#[derive(Debug, Clone)]
pub struct DynamicMessage {
    descriptor: &'static MessageDescriptor,
    values: Vec<FieldValue>,
    unknown: UnknownFields,
}

impl DynamicMessage {
    /// Creates a fully defaulted instance: strings `""`, messages absent.
    #[must_use]
    pub fn new(descriptor: &'static MessageDescriptor) -> Self {
        Self {
            descriptor,
            values: descriptor
                .fields
                .iter()
                .map(|f| FieldValue::default_for(f.kind))
                .collect(),
            unknown: UnknownFields::default(),
        }
    }

    /// Builds an instance from a partial field map. Fields not supplied keep
    /// their defaults; names may be declared or JSON names.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] for an undeclared name or a value whose kind or
    /// nested type disagrees with the schema.
    pub fn build<'a, I>(descriptor: &'static MessageDescriptor, partial: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = (&'a str, FieldValue)>,
    {
        let mut msg = Self::new(descriptor);
        for (name, value) in partial {
            msg.set(name, value)?;
        }
        Ok(msg)
    }

    /// Descriptor of this instance's type.
    #[must_use]
    pub const fn descriptor(&self) -> &'static MessageDescriptor {
        self.descriptor
    }

    /// Iterates fields with their current values, in field-number order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &FieldValue)> {
        self.descriptor.fields.iter().zip(&self.values)
    }

    /// Value of a field by declared or JSON name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        let (index, _) = self.descriptor.field_by_json_key(name)?;
        self.values.get(index)
    }

    /// Value of a string field by number. `None` if the number is not a
    /// declared string field.
    #[must_use]
    pub fn get_string(&self, number: u32) -> Option<&str> {
        let (index, _) = self.descriptor.field_by_number(number)?;
        match self.values.get(index)? {
            FieldValue::String(s) => Some(s),
            FieldValue::Message(_) => None,
        }
    }

    /// Value of a message field by number. `None` if absent or not a
    /// declared message field.
    #[must_use]
    pub fn get_message(&self, number: u32) -> Option<&Self> {
        let (index, _) = self.descriptor.field_by_number(number)?;
        match self.values.get(index)? {
            FieldValue::Message(m) => m.as_ref(),
            FieldValue::String(_) => None,
        }
    }

    /// Replaces a field's value by declared or JSON name.
    ///
    /// # Errors
    ///
    /// See [`Self::build`].
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<(), BuildError> {
        let (index, field) =
            self.descriptor
                .field_by_json_key(name)
                .ok_or_else(|| BuildError::UnknownField {
                    type_name: self.descriptor.type_name,
                    field: name.to_owned(),
                })?;
        check_value(field, &value)?;
        self.values[index] = value;
        Ok(())
    }

    /// Takes a string field's value, leaving `""` behind.
    pub fn take_string(&mut self, number: u32) -> String {
        match self.slot_mut(number) {
            Some(FieldValue::String(s)) => std::mem::take(s),
            _ => String::new(),
        }
    }

    /// Takes a message field's value, leaving it absent.
    pub fn take_message(&mut self, number: u32) -> Option<Self> {
        match self.slot_mut(number) {
            Some(FieldValue::Message(m)) => m.take(),
            _ => None,
        }
    }

    /// Whether every declared field holds its default.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.values.iter().all(FieldValue::is_default)
    }

    /// Retained unknown binary fields.
    #[must_use]
    pub const fn unknown_fields(&self) -> &UnknownFields {
        &self.unknown
    }

    /// Mutable access to retained unknown binary fields.
    pub fn unknown_fields_mut(&mut self) -> &mut UnknownFields {
        &mut self.unknown
    }

    pub(crate) fn put(&mut self, number: u32, value: FieldValue) {
        if let Some(slot) = self.slot_mut(number) {
            *slot = value;
        }
    }

    pub(crate) fn value_mut(&mut self, index: usize) -> Option<&mut FieldValue> {
        self.values.get_mut(index)
    }

    pub(crate) fn values(&self) -> &[FieldValue] {
        &self.values
    }

    fn slot_mut(&mut self, number: u32) -> Option<&mut FieldValue> {
        let (index, _) = self.descriptor.field_by_number(number)?;
        self.values.get_mut(index)
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        crate::equality::equals(Some(self), Some(other))
    }
}

impl Eq for DynamicMessage {}

fn check_value(field: &FieldDescriptor, value: &FieldValue) -> Result<(), BuildError> {
    match (field.kind, value) {
        (FieldKind::String, FieldValue::String(_))
        | (FieldKind::Message(_), FieldValue::Message(None)) => Ok(()),
        (FieldKind::Message(expected), FieldValue::Message(Some(nested))) => {
            if nested.descriptor == expected {
                Ok(())
            } else {
                Err(BuildError::TypeMismatch {
                    field: field.name,
                    expected: expected.type_name,
                    found: nested.descriptor.type_name,
                })
            }
        }
        (kind, value) => Err(BuildError::KindMismatch {
            field: field.name,
            expected: kind.name(),
            found: value.kind_name(),
        }),
    }
}
