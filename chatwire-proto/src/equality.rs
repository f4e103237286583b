//! Structural, absence-aware message equality.
//!
//! Absent vs absent is equal, absent vs present is not, and two present
//! messages are equal iff they share a type and every declared field is
//! pairwise equal. Retained unknown fields are ignored.

use crate::dynamic::{DynamicMessage, FieldValue};

/// Compares two optional messages.
#[must_use]
pub fn equals(a: Option<&DynamicMessage>, b: Option<&DynamicMessage>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.descriptor() == b.descriptor()
                && a
                    .values()
                    .iter()
                    .zip(b.values())
                    .all(|(x, y)| field_equals(x, y))
        }
        _ => false,
    }
}

fn field_equals(a: &FieldValue, b: &FieldValue) -> bool {
    match (a, b) {
        (FieldValue::String(x), FieldValue::String(y)) => x == y,
        (FieldValue::Message(x), FieldValue::Message(y)) => equals(x.as_ref(), y.as_ref()),
        _ => false,
    }
}
