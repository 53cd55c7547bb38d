//! Settings store.
//!
//! Combines a [`SettingsBackend`], the [`SettingsCipher`] and a
//! [`SettingsCache`] into a typed key/value API:
//!
//! - Reads go through the cache, then the backend. A read never fails; a
//!   missing, unreadable or mistyped value yields the caller's default and
//!   is logged.
//! - Writes encode, optionally encrypt, persist and then update the cache.
//!   They are serialized by a store-level lock so that the row and the
//!   cache entry cannot diverge. A read that misses the cache takes the
//!   same lock before it loads the row and fills the cache.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::crypto::SettingsCipher;
use crate::error::{PostdeskError, Result};
use crate::settings::backup::{
    is_sentinel, SettingsBackup, DECRYPT_ERROR_SENTINEL, ENCRYPTED_SENTINEL,
};
use crate::settings::cache::SettingsCache;
use crate::settings::keys::is_sensitive_key;
use crate::settings::value::{decode_value, encode_value};
use crate::storage::traits::SettingsBackend;
use crate::storage::types::{Setting, SettingRecord};

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Entries written
    pub applied: usize,
    /// Sentinel placeholders left untouched
    pub skipped: usize,
}

pub struct SettingsStore<B: SettingsBackend> {
    backend: B,
    cipher: SettingsCipher,
    cache: SettingsCache,
    write_lock: Mutex<()>,
}

impl<B: SettingsBackend> SettingsStore<B> {
    /// Store with the default five-minute cache.
    pub fn new(backend: B, cipher: SettingsCipher) -> Self {
        Self::with_cache(backend, cipher, SettingsCache::new())
    }

    pub fn with_cache(backend: B, cipher: SettingsCipher, cache: SettingsCache) -> Self {
        Self {
            backend,
            cipher,
            cache,
            write_lock: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cipher(&self) -> &SettingsCipher {
        &self.cipher
    }

    pub fn cache(&self) -> &SettingsCache {
        &self.cache
    }

    // The lock guards no data of its own, so a poisoned guard is still usable.
    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Typed read. `None` when the key is absent, null, or unreadable as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = match self.read_value(key) {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read setting, using default");
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::warn!(key, error = %e, "setting has unexpected type, using default");
                None
            }
        }
    }

    /// Typed read falling back to `default`.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    fn read_value(&self, key: &str) -> Result<Option<Value>> {
        if let Some(value) = self.cached_value(key) {
            return Ok(value);
        }

        // Filling the cache races with set/delete unless it holds the write lock.
        let _guard = self.write_guard();
        if let Some(value) = self.cached_value(key) {
            return Ok(value);
        }

        let Some(setting) = self.backend.find(key)? else {
            return Ok(None);
        };
        let Some(value) = self.decode_setting(&setting)? else {
            return Ok(None);
        };

        self.cache.set(key, value.clone(), setting.is_encrypted);
        Ok(Some(value))
    }

    fn cached_value(&self, key: &str) -> Option<Option<Value>> {
        let hit = self.cache.get(key)?;
        tracing::debug!(key, "settings cache hit");
        Some(Some(hit.value).filter(|value| !value.is_null()))
    }

    /// Decrypt and decode a row. `None` for a null value.
    fn decode_setting(&self, setting: &Setting) -> Result<Option<Value>> {
        let Some(stored) = setting.value.as_deref() else {
            return Ok(None);
        };
        let value = if setting.is_encrypted {
            let plaintext = self.cipher.decrypt(stored)?;
            decode_value(&plaintext, setting.value_kind)?
        } else {
            decode_value(stored, setting.value_kind)?
        };
        Ok(Some(value))
    }

    /// Persist a value, encrypting it when `encrypt` is set.
    ///
    /// A null value is stored as SQL NULL and is never marked encrypted.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, encrypt: bool) -> Result<()> {
        let value = serde_json::to_value(value)?;
        let _guard = self.write_guard();
        self.write_value(key, value, encrypt)
    }

    // Callers must hold the write lock.
    fn write_value(&self, key: &str, value: Value, encrypt: bool) -> Result<()> {
        let encoded = encode_value(&value)?;
        let (stored, is_encrypted) = match encoded.text {
            Some(text) if encrypt => (Some(self.cipher.encrypt(&text)?), true),
            other => (other, false),
        };

        self.backend.upsert(&SettingRecord {
            key: key.to_string(),
            value: stored,
            value_kind: encoded.kind,
            is_encrypted,
        })?;
        self.cache.set(key, value, is_encrypted);

        tracing::debug!(key, encrypted = is_encrypted, "setting written");
        Ok(())
    }

    /// Remove a setting.
    ///
    /// # Errors
    ///
    /// Returns `PostdeskError::Persistence` if the key does not exist.
    pub fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.write_guard();
        self.backend.delete(key)?;
        self.cache.invalidate(key);
        tracing::debug!(key, "setting deleted");
        Ok(())
    }

    /// Every setting, decoded.
    ///
    /// Encrypted values are replaced by `"[ENCRYPTED]"` unless
    /// `include_encrypted` is set. A value that cannot be decrypted or
    /// decoded is replaced by `"[DECRYPT_ERROR]"`.
    pub fn get_all(&self, include_encrypted: bool) -> Result<BTreeMap<String, Value>> {
        let mut result = BTreeMap::new();

        for setting in self.backend.find_all()? {
            if setting.is_encrypted && !include_encrypted {
                result.insert(setting.key, Value::String(ENCRYPTED_SENTINEL.to_string()));
                continue;
            }

            let value = match self.decode_setting(&setting) {
                Ok(value) => value.unwrap_or(Value::Null),
                Err(e) => {
                    tracing::warn!(key = %setting.key, error = %e, "failed to decode setting");
                    Value::String(DECRYPT_ERROR_SENTINEL.to_string())
                }
            };
            result.insert(setting.key, value);
        }

        Ok(result)
    }

    /// Write every entry of `settings`, skipping sentinel placeholders.
    ///
    /// Sensitive keys are encrypted when `encrypt_sensitive` is set. A failed
    /// entry does not stop the import.
    ///
    /// # Errors
    ///
    /// Returns `PostdeskError::PartialImport` after processing every entry if
    /// any of them could not be written.
    pub fn import_settings(
        &self,
        settings: &Map<String, Value>,
        encrypt_sensitive: bool,
    ) -> Result<ImportSummary> {
        let _guard = self.write_guard();
        let mut summary = ImportSummary::default();
        let mut failed = Vec::new();

        for (key, value) in settings {
            if is_sentinel(value) {
                summary.skipped += 1;
                continue;
            }

            let encrypt = encrypt_sensitive && is_sensitive_key(key);
            match self.write_value(key, value.clone(), encrypt) {
                Ok(()) => summary.applied += 1,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "failed to import setting");
                    failed.push(key.clone());
                }
            }
        }

        if !failed.is_empty() {
            return Err(PostdeskError::PartialImport {
                applied: summary.applied,
                failed,
            });
        }
        Ok(summary)
    }

    /// Delete every setting and empty the cache.
    pub fn reset(&self) -> Result<usize> {
        let _guard = self.write_guard();
        let removed = self.backend.delete_all()?;
        self.cache.clear();
        tracing::info!(removed, "all settings reset");
        Ok(removed)
    }

    /// Pretty-printed backup document. Encrypted values are not revealed.
    pub fn create_backup(&self) -> Result<String> {
        let settings = self.get_all(false)?.into_iter().collect();
        SettingsBackup::new(settings).to_json_pretty()
    }

    /// Import the `settings` object of a backup document, encrypting
    /// sensitive keys.
    pub fn restore_from_backup(&self, data: &str) -> Result<ImportSummary> {
        let backup = SettingsBackup::parse(data)?;
        let summary = self.import_settings(&backup.settings, true)?;
        tracing::info!(
            applied = summary.applied,
            skipped = summary.skipped,
            "settings restored from backup"
        );
        Ok(summary)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl<B: SettingsBackend> std::fmt::Debug for SettingsStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("cipher", &self.cipher)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}
