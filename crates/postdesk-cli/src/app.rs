//! Application context for the Postdesk CLI.
//!
//! Loads the optional config file once and wires the settings stack
//! (host identity, key, cipher, backend, store) on demand.

use std::path::{Path, PathBuf};
use std::time::Duration;

use postdesk_core::crypto::{derive_key, HostIdentity, SettingsCipher};
use postdesk_core::settings::{SettingsCache, SettingsStore};
use postdesk_core::storage::SqliteBackend;
use postdesk_core::VERSION;

use crate::cli::Cli;
use crate::config::{
    read_config, resolve_config_path, PostdeskConfig, DEFAULT_CACHE_TTL_SECONDS, DEFAULT_LOG_LEVEL,
};

/// Name mixed into the key material; changing it orphans encrypted values.
pub const APP_NAME: &str = "postdesk";

pub struct AppContext<'a> {
    cli: &'a Cli,
    config_path: PathBuf,
    config: Option<PostdeskConfig>,
}

impl<'a> AppContext<'a> {
    /// Resolve and read the config file, if one exists.
    pub fn load(cli: &'a Cli) -> anyhow::Result<Self> {
        let config_path = resolve_config_path()?;
        let config = if config_path.exists() {
            Some(read_config(&config_path)?)
        } else {
            None
        };
        Ok(Self {
            cli,
            config_path,
            config,
        })
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> Option<&PostdeskConfig> {
        self.config.as_ref()
    }

    pub fn log_level(&self) -> &str {
        self.config
            .as_ref()
            .map(|config| config.logging.level.as_str())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn cache_ttl(&self) -> Duration {
        let seconds = self
            .config
            .as_ref()
            .map(|config| config.cache.ttl_seconds)
            .unwrap_or(DEFAULT_CACHE_TTL_SECONDS);
        Duration::from_secs(seconds)
    }

    /// Database path from `--database`/`POSTDESK_DATABASE`, then the config.
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.cli.database.as_deref() {
            return Ok(PathBuf::from(path));
        }
        match &self.config {
            Some(config) => Ok(PathBuf::from(&config.database.path)),
            None => Err(anyhow::anyhow!(missing_config_message(&self.config_path))),
        }
    }

    pub fn cipher(&self) -> anyhow::Result<SettingsCipher> {
        let identity = HostIdentity::detect(APP_NAME, VERSION);
        let key = derive_key(&identity)
            .map_err(|e| anyhow::anyhow!("Failed to derive settings key: {}", e))?;
        Ok(SettingsCipher::new(key))
    }

    /// Open the database and build the settings store over it.
    pub fn open_store(&self) -> anyhow::Result<SettingsStore<SqliteBackend>> {
        let path = self.database_path()?;
        if !path.exists() {
            return Err(anyhow::anyhow!(missing_database_message(&path)));
        }
        let backend = SqliteBackend::open(&path)?;
        tracing::debug!(path = %path.display(), "opened settings database");
        Ok(SettingsStore::with_cache(
            backend,
            self.cipher()?,
            SettingsCache::with_ttl(self.cache_ttl()),
        ))
    }
}

pub fn missing_config_message(config_path: &Path) -> String {
    format!(
        "Config file not found: {}\nHint: Run `postdesk init`, or pass --database / set POSTDESK_CONFIG.",
        config_path.display()
    )
}

pub fn missing_database_message(path: &Path) -> String {
    format!(
        "Settings database not found: {}\nHint: Run `postdesk init` to create it.",
        path.display()
    )
}
