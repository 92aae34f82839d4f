//! Core domain types shared by the extractor and the harvester.

use serde_json::Value;

/// A single input record: an ordered mapping from field name to JSON value.
///
/// `serde_json` is built with `preserve_order`, so insertion order survives
/// parsing and re-serialization. Records have no fixed schema.
pub type Record = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// FieldKind
// ---------------------------------------------------------------------------

/// Coarse type of a record field, used by column auto-detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A string value.
    Text,
    /// An integer or float.
    Number,
    /// A boolean.
    Bool,
    /// An explicit null.
    Null,
    /// Arrays, objects — anything non-scalar.
    Other,
}

impl FieldKind {
    /// Classify a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::Text,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Bool,
            Value::Null => Self::Null,
            Value::Array(_) | Value::Object(_) => Self::Other,
        }
    }

    /// Whether this field holds text.
    pub fn is_text(self) -> bool {
        matches!(self, Self::Text)
    }
}

// ---------------------------------------------------------------------------
// scalar_to_text
// ---------------------------------------------------------------------------

/// Total conversion from any JSON value to its text form.
///
/// Nulls become the empty string (and are later dropped by the builder),
/// strings pass through, numbers and booleans use their display form, and
/// composite values fall back to compact JSON.
pub fn scalar_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
