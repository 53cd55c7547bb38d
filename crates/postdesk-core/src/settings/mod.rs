//! Settings store, cache, backups and the application settings schema.

pub mod app;
pub mod backup;
pub mod cache;
pub mod keys;
pub mod store;
pub mod value;

pub use app::{AppSettings, AppSettingsPatch, AppSettingsStore, Tone, UiTheme};
pub use backup::{SettingsBackup, BACKUP_FORMAT_VERSION, DECRYPT_ERROR_SENTINEL, ENCRYPTED_SENTINEL};
pub use cache::{CachedValue, SettingsCache, DEFAULT_CACHE_TTL};
pub use keys::{camel_to_snake, is_sensitive_key, SENSITIVE_KEYS};
pub use store::{ImportSummary, SettingsStore};
