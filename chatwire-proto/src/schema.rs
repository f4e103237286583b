//! Static message descriptors.
//!
//! A [`MessageDescriptor`] is the single source of truth for a message
//! type's shape: the binary codec, the JSON codec and the equality engine
//! all walk its field list instead of carrying per-type logic. Descriptors
//! are plain `static` data, so they are built once at compile time and can
//! be shared by reference across threads without synchronization.

/// Encoding kind of a field.
#[derive(Clone, Copy)]
pub enum FieldKind {
    /// UTF-8 string scalar. Defaults to `""`.
    String,
    /// Embedded message. Absent by default.
    Message(&'static MessageDescriptor),
}

impl FieldKind {
    /// Human-readable kind name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Message(_) => "message",
        }
    }
}

// Only the nested type's name is printed so self-referencing schemas
// cannot recurse forever.
impl std::fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Message(desc) => f.debug_tuple("Message").field(&desc.type_name).finish(),
        }
    }
}

impl PartialEq for FieldKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String, Self::String) => true,
            (Self::Message(a), Self::Message(b)) => a.type_name == b.type_name,
            _ => false,
        }
    }
}

impl Eq for FieldKind {}

/// One field of a message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Wire identity. Never reused for a different kind.
    pub number: u32,
    /// Declared (snake_case) name.
    pub name: &'static str,
    /// camelCase name used as the JSON key.
    pub json_name: &'static str,
    /// Encoding kind.
    pub kind: FieldKind,
}

/// Shape of a message type.
#[derive(Debug)]
pub struct MessageDescriptor {
    /// Fully qualified name, e.g. `chat.Message`.
    pub type_name: &'static str,
    /// Fields in ascending field-number order.
    pub fields: &'static [FieldDescriptor],
}

impl MessageDescriptor {
    /// Type name without the package prefix.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.type_name
            .rsplit_once('.')
            .map_or(self.type_name, |(_, name)| name)
    }

    /// Finds a field by its wire number, with its position in [`Self::fields`].
    #[must_use]
    pub fn field_by_number(&self, number: u32) -> Option<(usize, &'static FieldDescriptor)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.number == number)
    }

    /// Finds a field by its declared name.
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<(usize, &'static FieldDescriptor)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    /// Finds a field by JSON key, accepting the camelCase JSON name or the
    /// declared name.
    #[must_use]
    pub fn field_by_json_key(&self, key: &str) -> Option<(usize, &'static FieldDescriptor)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.json_name == key || f.name == key)
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}

impl Eq for MessageDescriptor {}

impl std::fmt::Display for MessageDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Derives the protobuf JSON name of a declared field name.
///
/// Underscores are dropped and the letter following each one is
/// upper-cased: `user_name` becomes `userName`.
#[must_use]
pub fn json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
