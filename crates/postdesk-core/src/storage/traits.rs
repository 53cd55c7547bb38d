//! Settings backend trait definition.
//!
//! The `SettingsBackend` trait is the persistence boundary of the settings
//! store: a single table of rows keyed by setting key. Encryption, encoding
//! and caching all happen above it.

use crate::error::Result;
use crate::storage::types::{Setting, SettingRecord};

/// Persistence interface for setting rows.
///
/// Implementations must ensure:
/// - Keys are unique; `upsert` replaces the value of an existing key
/// - `created_at` survives upserts, `updated_at` is refreshed by them
/// - Values are stored exactly as given (no re-encoding)
pub trait SettingsBackend: Send + Sync {
    /// Get a row by key.
    ///
    /// Returns `Ok(None)` if the key has never been written or was deleted.
    fn find(&self, key: &str) -> Result<Option<Setting>>;

    /// List every row, ordered by key.
    fn find_all(&self) -> Result<Vec<Setting>>;

    /// Insert the row, or update value, kind and encryption flag if it exists.
    ///
    /// # Errors
    ///
    /// Returns `PostdeskError::Persistence` if the write fails.
    fn upsert(&self, record: &SettingRecord) -> Result<()>;

    /// Remove a row.
    ///
    /// # Errors
    ///
    /// Returns `PostdeskError::Persistence` if no row has this key or the
    /// delete fails.
    fn delete(&self, key: &str) -> Result<()>;

    /// Remove every row, returning how many were removed.
    fn delete_all(&self) -> Result<usize>;
}

impl<B: SettingsBackend + ?Sized> SettingsBackend for &B {
    fn find(&self, key: &str) -> Result<Option<Setting>> {
        (**self).find(key)
    }

    fn find_all(&self) -> Result<Vec<Setting>> {
        (**self).find_all()
    }

    fn upsert(&self, record: &SettingRecord) -> Result<()> {
        (**self).upsert(record)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn delete_all(&self) -> Result<usize> {
        (**self).delete_all()
    }
}

impl<B: SettingsBackend + ?Sized> SettingsBackend for std::sync::Arc<B> {
    fn find(&self, key: &str) -> Result<Option<Setting>> {
        (**self).find(key)
    }

    fn find_all(&self) -> Result<Vec<Setting>> {
        (**self).find_all()
    }

    fn upsert(&self, record: &SettingRecord) -> Result<()> {
        (**self).upsert(record)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn delete_all(&self) -> Result<usize> {
        (**self).delete_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_is_object_safe() {
        fn _accepts_dyn(_backend: &dyn SettingsBackend) {}
    }

    #[test]
    fn test_references_are_backends() {
        fn _accepts_backend<B: SettingsBackend>(_backend: B) {}
        fn _accepts_ref<B: SettingsBackend>(backend: &B) {
            _accepts_backend(backend);
        }
    }
}
