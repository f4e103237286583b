//! Error type shared by the binary and JSON codecs.

/// Error returned when a binary or JSON payload cannot be decoded.
///
/// Skipping an unknown binary field number, or an unknown JSON key outside
/// strict mode, is normal behavior and never produces one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// Truncated or invalid tag, varint or length prefix.
    #[error("malformed binary payload: {0}")]
    MalformedBinary(String),

    /// A string field payload is not valid UTF-8.
    #[error("invalid UTF-8 in string field `{field}`")]
    InvalidUtf8 {
        /// Declared name of the offending field.
        field: &'static str,
    },

    /// The wire data disagrees with the kind the schema declares for a field.
    #[error("kind mismatch for field `{field}`: {detail}")]
    KindMismatch {
        /// Declared name of the offending field.
        field: &'static str,
        /// What was expected and what was found.
        detail: String,
    },

    /// JSON input is not syntactically valid or not an object.
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// Strict JSON decoding met a key the schema does not declare.
    #[error("unknown field `{0}` rejected in strict mode")]
    StrictUnknownField(String),

    /// The same field was given under both its JSON name and its proto name.
    #[error("field `{0}` given more than once")]
    DuplicateField(&'static str),
}

const RECURSION_LIMIT_EXCEEDED: &str = "recursion limit exceeded";

impl WireError {
    pub(crate) fn recursion_limit() -> Self {
        Self::MalformedBinary(RECURSION_LIMIT_EXCEEDED.to_owned())
    }

    /// Whether this is the error raised for input nested past
    /// [`RECURSION_LIMIT`](crate::wire::RECURSION_LIMIT).
    #[must_use]
    pub fn is_recursion_limit(&self) -> bool {
        matches!(self, Self::MalformedBinary(detail) if detail == RECURSION_LIMIT_EXCEEDED)
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedBinary(detail.into())
    }

    pub(crate) fn kind_mismatch(field: &'static str, detail: impl Into<String>) -> Self {
        Self::KindMismatch {
            field,
            detail: detail.into(),
        }
    }
}
