use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Serialize, Deserialize)]
pub struct PostdeskConfig {
    pub database: DatabaseSection,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheSection {
    pub ttl_seconds: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl PostdeskConfig {
    pub fn new(database_path: PathBuf, cache_ttl_seconds: u64, log_level: String) -> Self {
        Self {
            database: DatabaseSection {
                path: database_path.to_string_lossy().to_string(),
            },
            cache: CacheSection {
                ttl_seconds: cache_ttl_seconds,
            },
            logging: LoggingSection { level: log_level },
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_database_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("postdesk.db"))
}

/// Config file location, honoring `POSTDESK_CONFIG`.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("POSTDESK_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

pub fn read_config(path: &Path) -> anyhow::Result<PostdeskConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &PostdeskConfig) -> anyhow::Result<()> {
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    postdesk_core::fs::write_atomic(path, contents.as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("postdesk"));
        }
    }
    Ok(home_dir()?.join(".config").join("postdesk"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("postdesk"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("postdesk"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
