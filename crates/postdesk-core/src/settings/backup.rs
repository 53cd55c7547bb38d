//! Backup document format.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PostdeskError, Result};

/// Format version written into every backup.
pub const BACKUP_FORMAT_VERSION: &str = "1.0.0";

/// Placeholder for an encrypted value that was not revealed.
pub const ENCRYPTED_SENTINEL: &str = "[ENCRYPTED]";

/// Placeholder for a value that could not be decrypted or decoded.
pub const DECRYPT_ERROR_SENTINEL: &str = "[DECRYPT_ERROR]";

/// A serialized snapshot of the settings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsBackup {
    pub version: String,
    /// RFC 3339 creation time
    pub timestamp: String,
    pub settings: Map<String, Value>,
}

impl SettingsBackup {
    pub fn new(settings: Map<String, Value>) -> Self {
        Self {
            version: BACKUP_FORMAT_VERSION.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            settings,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a backup document.
    ///
    /// Only the `settings` object is required; `version` and `timestamp`
    /// default to empty strings when absent.
    pub fn parse(data: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(data)
            .map_err(|e| PostdeskError::InvalidBackupFormat(format!("not valid JSON: {}", e)))?;
        let Value::Object(mut document) = document else {
            return Err(PostdeskError::InvalidBackupFormat(
                "backup must be a JSON object".to_string(),
            ));
        };

        let settings = match document.remove("settings") {
            Some(Value::Object(settings)) => settings,
            Some(_) => {
                return Err(PostdeskError::InvalidBackupFormat(
                    "\"settings\" must be an object".to_string(),
                ))
            }
            None => {
                return Err(PostdeskError::InvalidBackupFormat(
                    "missing \"settings\" object".to_string(),
                ))
            }
        };

        let text_field = |value: Option<Value>| match value {
            Some(Value::String(text)) => text,
            _ => String::new(),
        };
        if let Some(version) = document.get("version").and_then(Value::as_str) {
            if version != BACKUP_FORMAT_VERSION {
                tracing::warn!(version, "restoring backup with unknown format version");
            }
        }

        Ok(Self {
            version: text_field(document.remove("version")),
            timestamp: text_field(document.remove("timestamp")),
            settings,
        })
    }
}

/// Whether a value is one of the placeholders written into backups.
pub fn is_sentinel(value: &Value) -> bool {
    matches!(value.as_str(), Some(ENCRYPTED_SENTINEL) | Some(DECRYPT_ERROR_SENTINEL))
}
