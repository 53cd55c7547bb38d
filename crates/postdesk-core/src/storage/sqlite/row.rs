//! Setting row type for database queries.

use chrono::{DateTime, Utc};

use crate::error::{PostdeskError, Result};
use crate::storage::types::{Setting, ValueKind};

/// Raw row data from the settings table, before parsing into domain types.
#[derive(Debug)]
pub struct SettingRow {
    pub key: String,
    pub value: Option<String>,
    pub value_kind: String,
    pub is_encrypted: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl SettingRow {
    /// Columns in the order `from_row` expects them.
    pub const COLUMNS: &'static str =
        "key, value, value_kind, is_encrypted, created_at, updated_at";

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            value: row.get(1)?,
            value_kind: row.get(2)?,
            is_encrypted: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| PostdeskError::Persistence(format!("Invalid {} timestamp: {}", field, e)))
}

impl TryFrom<SettingRow> for Setting {
    type Error = PostdeskError;

    fn try_from(row: SettingRow) -> Result<Self> {
        let value_kind: ValueKind = row.value_kind.parse()?;
        let created_at = parse_timestamp("created_at", &row.created_at)?;
        let updated_at = parse_timestamp("updated_at", &row.updated_at)?;

        Ok(Setting {
            key: row.key,
            value: row.value,
            value_kind,
            is_encrypted: row.is_encrypted,
            created_at,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(value_kind: &str, created_at: &str) -> SettingRow {
        SettingRow {
            key: "theme".to_string(),
            value: Some("dark".to_string()),
            value_kind: value_kind.to_string(),
            is_encrypted: false,
            created_at: created_at.to_string(),
            updated_at: "2025-01-02T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_row_converts() {
        let setting = Setting::try_from(row("text", "2025-01-01T00:00:00+00:00")).unwrap();
        assert_eq!(setting.key, "theme");
        assert_eq!(setting.value_kind, ValueKind::Text);
        assert!(setting.created_at < setting.updated_at);
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let result = Setting::try_from(row("text", "yesterday"));
        assert!(matches!(result, Err(PostdeskError::Persistence(_))));
    }

    #[test]
    fn test_bad_kind_rejected() {
        assert!(Setting::try_from(row("xml", "2025-01-01T00:00:00+00:00")).is_err());
    }
}
