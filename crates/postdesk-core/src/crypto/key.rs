//! Key derivation from the host identity.
//!
//! The settings key is never stored. It is re-derived at every start with
//! PBKDF2-HMAC-SHA256 over the identity string, salted with the SHA-256 of
//! that same string, so the same host and user always get the same key.

use hmac::Hmac;
use sha2::{Digest, Sha256};
use zeroize::ZeroizeOnDrop;

use crate::crypto::identity::HostIdentity;
use crate::error::{PostdeskError, Result};

/// PBKDF2 rounds for the settings key.
pub const KEY_DERIVATION_ITERATIONS: u32 = 100_000;

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256).
pub const KEY_LENGTH: usize = 32;

/// A symmetric key derived from the host identity.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Wrap raw key bytes.
    ///
    /// # Security
    ///
    /// The caller is responsible for ensuring the bytes come from a secure source.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }

    /// Short hex fingerprint for diagnostics: first 8 bytes of SHA-256(key).
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.key);
        hex::encode(&digest[..8])
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive the settings key for `identity`.
///
/// Same identity always produces the same key; changing any part (for
/// example the hostname) produces a different one.
///
/// # Errors
///
/// Returns `PostdeskError::KeyDerivation` if the PBKDF2 primitive rejects its
/// parameters. Callers must treat this as fatal.
pub fn derive_key(identity: &HostIdentity) -> Result<DerivedKey> {
    let material = identity.key_material();
    let salt = Sha256::digest(material.as_bytes());

    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(
        material.as_bytes(),
        &salt,
        KEY_DERIVATION_ITERATIONS,
        &mut key_bytes,
    )
    .map_err(|e| PostdeskError::KeyDerivation(format!("PBKDF2 failed: {}", e)))?;

    tracing::debug!(app = %identity.app_name, "settings key derived");
    Ok(DerivedKey::from_bytes(key_bytes))
}
