//! Typed application settings.
//!
//! Each camelCase field of [`AppSettings`] is stored under its snake_case
//! key (`maxCharacterCount` → `max_character_count`). Credentials are
//! encrypted on write.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crypto::redact_for_logging;
use crate::error::{PostdeskError, Result};
use crate::settings::keys::{camel_to_snake, is_sensitive_key};
use crate::settings::store::SettingsStore;
use crate::storage::traits::SettingsBackend;

/// Voice used for generated drafts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Casual,
    Formal,
    Explanatory,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tone::Casual => write!(f, "casual"),
            Tone::Formal => write!(f, "formal"),
            Tone::Explanatory => write!(f, "explanatory"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiTheme {
    Light,
    Dark,
    #[default]
    Auto,
}

impl fmt::Display for UiTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiTheme::Light => write!(f, "light"),
            UiTheme::Dark => write!(f, "dark"),
            UiTheme::Auto => write!(f, "auto"),
        }
    }
}

/// The full application settings schema with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    // Credentials
    pub news_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub x_api_key: Option<String>,
    pub x_api_secret: Option<String>,
    pub x_bearer_token: Option<String>,

    // Collection
    pub auto_collection_enabled: bool,
    /// Hours between collection runs
    pub collection_interval: u32,
    pub max_articles_per_theme: u32,

    // Generation
    pub default_tone: Tone,
    pub max_character_count: u32,
    pub include_hashtag_suggestions: bool,

    // Notifications
    pub enable_notifications: bool,
    pub reminder_enabled: bool,
    pub default_reminder_minutes: u32,

    // Interface
    pub theme: UiTheme,
    pub sidebar_collapsed: bool,
    pub compact_mode: bool,

    // Data management
    pub auto_backup_enabled: bool,
    /// Days between automatic backups
    pub backup_interval: u32,
    pub max_backups: u32,

    // Security
    /// Minutes of inactivity before the session locks
    pub session_timeout: u32,
    pub require_confirmation: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            news_api_key: None,
            openai_api_key: None,
            x_api_key: None,
            x_api_secret: None,
            x_bearer_token: None,
            auto_collection_enabled: false,
            collection_interval: 24,
            max_articles_per_theme: 20,
            default_tone: Tone::Casual,
            max_character_count: 280,
            include_hashtag_suggestions: true,
            enable_notifications: true,
            reminder_enabled: true,
            default_reminder_minutes: 10,
            theme: UiTheme::Auto,
            sidebar_collapsed: false,
            compact_mode: false,
            auto_backup_enabled: true,
            backup_interval: 7,
            max_backups: 5,
            session_timeout: 30,
            require_confirmation: true,
        }
    }
}

/// A partial update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AppSettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_api_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_bearer_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_collection_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_articles_per_theme: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_tone: Option<Tone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_character_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_hashtag_suggestions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_reminder_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<UiTheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar_collapsed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compact_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_backup_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_backups: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_confirmation: Option<bool>,
}

impl AppSettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Typed view of the application settings over a [`SettingsStore`].
pub struct AppSettingsStore<'a, B: SettingsBackend> {
    store: &'a SettingsStore<B>,
}

impl<'a, B: SettingsBackend> AppSettingsStore<'a, B> {
    pub fn new(store: &'a SettingsStore<B>) -> Self {
        Self { store }
    }

    /// Read every field. A field that is missing or unreadable takes its default.
    pub fn get_app_settings(&self) -> AppSettings {
        let d = AppSettings::default();
        let s = self.store;

        AppSettings {
            news_api_key: s.get("news_api_key"),
            openai_api_key: s.get("openai_api_key"),
            x_api_key: s.get("x_api_key"),
            x_api_secret: s.get("x_api_secret"),
            x_bearer_token: s.get("x_bearer_token"),
            auto_collection_enabled: s
                .get_or("auto_collection_enabled", d.auto_collection_enabled),
            collection_interval: s.get_or("collection_interval", d.collection_interval),
            max_articles_per_theme: s.get_or("max_articles_per_theme", d.max_articles_per_theme),
            default_tone: s.get_or("default_tone", d.default_tone),
            max_character_count: s.get_or("max_character_count", d.max_character_count),
            include_hashtag_suggestions: s
                .get_or("include_hashtag_suggestions", d.include_hashtag_suggestions),
            enable_notifications: s.get_or("enable_notifications", d.enable_notifications),
            reminder_enabled: s.get_or("reminder_enabled", d.reminder_enabled),
            default_reminder_minutes: s
                .get_or("default_reminder_minutes", d.default_reminder_minutes),
            theme: s.get_or("theme", d.theme),
            sidebar_collapsed: s.get_or("sidebar_collapsed", d.sidebar_collapsed),
            compact_mode: s.get_or("compact_mode", d.compact_mode),
            auto_backup_enabled: s.get_or("auto_backup_enabled", d.auto_backup_enabled),
            backup_interval: s.get_or("backup_interval", d.backup_interval),
            max_backups: s.get_or("max_backups", d.max_backups),
            session_timeout: s.get_or("session_timeout", d.session_timeout),
            require_confirmation: s.get_or("require_confirmation", d.require_confirmation),
        }
    }

    /// Write the `Some` fields of `patch`, encrypting credentials.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first failed write; fields written before it
    /// stay written.
    pub fn update_app_settings(&self, patch: &AppSettingsPatch) -> Result<()> {
        let Value::Object(fields) = serde_json::to_value(patch)? else {
            return Err(PostdeskError::InvalidInput(
                "settings patch must serialize to an object".to_string(),
            ));
        };

        let redacted = redact_for_logging(&Value::Object(fields.clone()));
        tracing::info!(patch = %redacted, "updating app settings");

        for (name, value) in fields {
            let key = camel_to_snake(&name);
            self.store.set(&key, &value, is_sensitive_key(&key))?;
        }
        Ok(())
    }
}

impl<B: SettingsBackend> SettingsStore<B> {
    /// Typed application settings view of this store.
    pub fn app(&self) -> AppSettingsStore<'_, B> {
        AppSettingsStore::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{DerivedKey, SettingsCipher};
    use crate::storage::sqlite::SqliteBackend;
    use serde_json::json;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    fn store() -> SettingsStore<SqliteBackend> {
        SettingsStore::new(
            SqliteBackend::open_in_memory().unwrap(),
            SettingsCipher::new(DerivedKey::from_bytes([3u8; 32])),
        )
    }

    #[test]
    fn test_empty_store_yields_defaults() {
        let store = store();
        assert_eq!(store.app().get_app_settings(), AppSettings::default());
    }

    #[test]
    fn test_defaults_match_schema() {
        let d = AppSettings::default();
        assert_eq!(d.collection_interval, 24);
        assert_eq!(d.max_articles_per_theme, 20);
        assert_eq!(d.default_tone, Tone::Casual);
        assert_eq!(d.max_character_count, 280);
        assert_eq!(d.default_reminder_minutes, 10);
        assert_eq!(d.theme, UiTheme::Auto);
        assert_eq!(d.backup_interval, 7);
        assert_eq!(d.max_backups, 5);
        assert_eq!(d.session_timeout, 30);
        assert!(d.require_confirmation);
        assert!(!d.auto_collection_enabled);
    }

    #[test]
    fn test_update_maps_names_and_encrypts_credentials() {
        let store = store();
        let patch = AppSettingsPatch {
            news_api_key: Some("abc".to_string()),
            max_character_count: Some(500),
            theme: Some(UiTheme::Dark),
            ..Default::default()
        };
        store.app().update_app_settings(&patch).unwrap();

        let key_row = store.backend().find("news_api_key").unwrap().unwrap();
        assert!(key_row.is_encrypted);
        let limit_row = store.backend().find("max_character_count").unwrap().unwrap();
        assert!(!limit_row.is_encrypted);
        assert_eq!(limit_row.value.as_deref(), Some("500"));

        store.clear_cache();
        let settings = store.app().get_app_settings();
        assert_eq!(settings.news_api_key.as_deref(), Some("abc"));
        assert_eq!(settings.max_character_count, 500);
        assert_eq!(settings.theme, UiTheme::Dark);
        assert_eq!(settings.max_backups, 5);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_update_logs_patch_with_credentials_redacted() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let store = store();
        let patch = AppSettingsPatch {
            news_api_key: Some("news-secret-42".to_string()),
            max_backups: Some(8),
            ..Default::default()
        };
        tracing::subscriber::with_default(subscriber, || {
            store.app().update_app_settings(&patch).unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("updating app settings"));
        assert!(output.contains("\"newsApiKey\":\"[REDACTED]\""));
        assert!(output.contains("\"maxBackups\":8"));
        assert!(!output.contains("news-secret-42"));
        assert_eq!(store.app().get_app_settings().max_backups, 8);
    }

    #[test]
    fn test_empty_patch_writes_nothing() {
        let store = store();
        let patch = AppSettingsPatch::default();
        assert!(patch.is_empty());
        store.app().update_app_settings(&patch).unwrap();
        assert!(store.backend().find_all().unwrap().is_empty());
    }

    #[test]
    fn test_bad_field_degrades_to_default() {
        let store = store();
        store.set("theme", "neon", false).unwrap();
        store.set("max_backups", &-4, false).unwrap();

        let settings = store.app().get_app_settings();
        assert_eq!(settings.theme, UiTheme::Auto);
        assert_eq!(settings.max_backups, 5);
    }

    #[test]
    fn test_patch_parses_camel_case() {
        let patch: AppSettingsPatch =
            serde_json::from_value(json!({ "defaultTone": "formal", "compactMode": true }))
                .unwrap();
        assert_eq!(patch.default_tone, Some(Tone::Formal));
        assert_eq!(patch.compact_mode, Some(true));

        let unknown = serde_json::from_value::<AppSettingsPatch>(json!({ "colour": "red" }));
        assert!(unknown.is_err());
    }

    #[test]
    fn test_settings_serialize_camel_case() {
        let value = serde_json::to_value(AppSettings::default()).unwrap();
        assert_eq!(value["maxCharacterCount"], json!(280));
        assert_eq!(value["defaultTone"], json!("casual"));
        assert_eq!(value["newsApiKey"], Value::Null);
    }
}
