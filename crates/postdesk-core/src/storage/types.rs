//! Core data types for the storage layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PostdeskError;

/// How a setting's plaintext was encoded.
///
/// Strings are stored verbatim as `Text`; every other value is stored as
/// JSON text. The tag is kept next to the value so that a string which
/// happens to look like JSON (`"true"`, `"280"`) reads back as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Json,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Json => "json",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = PostdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ValueKind::Text),
            "json" => Ok(ValueKind::Json),
            other => Err(PostdeskError::Persistence(format!(
                "Unknown value kind: {}",
                other
            ))),
        }
    }
}

/// A persisted setting row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    /// Unique snake_case key
    pub key: String,

    /// Encoded value, or an envelope when `is_encrypted` is set
    pub value: Option<String>,

    /// Encoding of the plaintext
    pub value_kind: ValueKind,

    /// Whether `value` holds an encryption envelope
    pub is_encrypted: bool,

    /// When the row was first written
    pub created_at: DateTime<Utc>,

    /// When the row was last written
    pub updated_at: DateTime<Utc>,
}

/// Values written by an upsert. Timestamps are managed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingRecord {
    pub key: String,
    pub value: Option<String>,
    pub value_kind: ValueKind,
    pub is_encrypted: bool,
}
