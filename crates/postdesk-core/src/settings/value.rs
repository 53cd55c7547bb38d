//! Tagged encoding of setting values into the text column.
//!
//! JSON strings are stored verbatim and tagged [`ValueKind::Text`]; every
//! other value is stored as compact JSON tagged [`ValueKind::Json`]. JSON
//! `null` is stored as SQL NULL. Decoding trusts the tag and never guesses.

use serde_json::Value;

use crate::error::{PostdeskError, Result};
use crate::storage::types::ValueKind;

/// Text form of a value plus its tag. `text` is `None` for JSON `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedValue {
    pub text: Option<String>,
    pub kind: ValueKind,
}

pub fn encode_value(value: &Value) -> Result<EncodedValue> {
    match value {
        Value::Null => Ok(EncodedValue {
            text: None,
            kind: ValueKind::Json,
        }),
        Value::String(text) => Ok(EncodedValue {
            text: Some(text.clone()),
            kind: ValueKind::Text,
        }),
        other => Ok(EncodedValue {
            text: Some(serde_json::to_string(other)?),
            kind: ValueKind::Json,
        }),
    }
}

pub fn decode_value(text: &str, kind: ValueKind) -> Result<Value> {
    match kind {
        ValueKind::Text => Ok(Value::String(text.to_string())),
        ValueKind::Json => serde_json::from_str(text).map_err(|e| {
            PostdeskError::Serialization(format!("Stored JSON value is invalid: {}", e))
        }),
    }
}
