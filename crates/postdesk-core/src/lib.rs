//! # Postdesk Core
//!
//! Settings layer for Postdesk, a local drafting tool for social-media posts.
//!
//! This crate provides the settings store, its encryption and caching, and the
//! typed application settings schema, independent of any user interface.
//!
//! ## Architecture
//!
//! - **crypto**: host-bound key derivation, AES-256-GCM envelopes, hashing, redaction
//! - **storage**: `Setting` rows and the `SettingsBackend` persistence trait (SQLite)
//! - **settings**: value encoding, TTL cache, settings store, backups, app settings
//! - **fs**: atomic file writes for backup and export files
//!
//! ## Wiring
//!
//! Components are built explicitly at startup and passed by reference:
//!
//! ```no_run
//! use postdesk_core::crypto::{derive_key, HostIdentity, SettingsCipher};
//! use postdesk_core::settings::SettingsStore;
//! use postdesk_core::storage::SqliteBackend;
//!
//! # fn main() -> postdesk_core::Result<()> {
//! let identity = HostIdentity::detect("postdesk", postdesk_core::VERSION);
//! let cipher = SettingsCipher::new(derive_key(&identity)?);
//! let backend = SqliteBackend::open(std::path::Path::new("postdesk.db"))?;
//! let store = SettingsStore::new(backend, cipher);
//!
//! store.set("max_character_count", &280, false)?;
//! let limit: u32 = store.get_or("max_character_count", 0);
//! assert_eq!(limit, 280);
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod error;
pub mod fs;
pub mod settings;
pub mod storage;

pub use error::{PostdeskError, Result};
pub use settings::{AppSettings, AppSettingsPatch, AppSettingsStore, SettingsStore};
pub use storage::SettingsBackend;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
