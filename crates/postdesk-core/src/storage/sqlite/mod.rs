//! SQLite settings backend.
//!
//! Rows live in a single `settings` table; a `meta` table records the
//! schema format and creation time. The connection is guarded by a mutex so
//! the backend can be shared across threads.

mod row;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{PostdeskError, Result};
use crate::storage::traits::SettingsBackend;
use crate::storage::types::{Setting, SettingRecord};

use row::SettingRow;

/// Current on-disk schema format.
pub const FORMAT_VERSION: &str = "1";

/// SQLite-backed settings table.
pub struct SqliteBackend {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open (or create) the database file at `path` and ensure the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    PostdeskError::Persistence(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT,
                value_kind TEXT NOT NULL DEFAULT 'text',
                is_encrypted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        let created_at = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES (?1, ?2)",
            params!["format_version", FORMAT_VERSION],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES (?1, ?2)",
            params!["created_at", created_at],
        )?;

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PostdeskError::Persistence("SQLite connection poisoned".to_string()))
    }

    /// Database file, or `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the connection answers a trivial query.
    pub fn health_check(&self) -> bool {
        match self.lock_conn() {
            Ok(conn) => conn
                .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Rebuild the database file to reclaim space.
    pub fn vacuum(&self) -> Result<()> {
        self.lock_conn()?.execute_batch("VACUUM;")?;
        Ok(())
    }

    /// Number of stored settings.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .lock_conn()?
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Schema format recorded in the meta table.
    pub fn format_version(&self) -> Result<String> {
        let version = self.lock_conn()?.query_row(
            "SELECT value FROM meta WHERE key = 'format_version'",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }
}

impl SettingsBackend for SqliteBackend {
    fn find(&self, key: &str) -> Result<Option<Setting>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM settings WHERE key = ?1", SettingRow::COLUMNS),
                [key],
                SettingRow::from_row,
            )
            .optional()?;
        row.map(Setting::try_from).transpose()
    }

    fn find_all(&self) -> Result<Vec<Setting>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM settings ORDER BY key",
            SettingRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map([], SettingRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(Setting::try_from).collect()
    }

    fn upsert(&self, record: &SettingRecord) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO settings (key, value, value_kind, is_encrypted, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                value_kind = excluded.value_kind,
                is_encrypted = excluded.is_encrypted,
                updated_at = excluded.updated_at
            "#,
            params![
                record.key,
                record.value,
                record.value_kind.as_str(),
                record.is_encrypted,
                now
            ],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let removed = self
            .lock_conn()?
            .execute("DELETE FROM settings WHERE key = ?1", [key])?;
        if removed == 0 {
            return Err(PostdeskError::Persistence(format!(
                "Setting not found: {}",
                key
            )));
        }
        Ok(())
    }

    fn delete_all(&self) -> Result<usize> {
        let removed = self.lock_conn()?.execute("DELETE FROM settings", [])?;
        Ok(removed)
    }
}
