//! Persistence for setting rows.
//!
//! The settings store talks to a [`SettingsBackend`]; [`SqliteBackend`] is
//! the on-disk implementation used by the application.

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteBackend;
pub use traits::SettingsBackend;
pub use types::{Setting, SettingRecord, ValueKind};
