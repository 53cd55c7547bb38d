//! AES-256-GCM envelopes for encrypted setting values.
//!
//! Envelope wire format (stored in the `value` column):
//!
//! ```text
//! base64( {"iv": hex(16 bytes), "authTag": hex(16 bytes), "ciphertext": hex} )
//! ```
//!
//! The IV is random per call. No associated data is bound.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Key, Nonce, Tag};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::key::DerivedKey;
use crate::error::{PostdeskError, Result};

/// IV length in bytes.
pub const IV_LENGTH: usize = 16;

/// Authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// AES-256-GCM with a 128-bit nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Decoded form of an encrypted setting value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub iv: String,
    #[serde(rename = "authTag")]
    pub auth_tag: String,
    #[serde(alias = "encrypted")]
    pub ciphertext: String,
}

impl Envelope {
    /// Decode the stored string form.
    pub fn decode(encoded: &str) -> Result<Self> {
        let json = STANDARD
            .decode(encoded.trim().as_bytes())
            .map_err(|e| PostdeskError::Decryption(format!("Envelope is not base64: {}", e)))?;
        serde_json::from_slice(&json)
            .map_err(|e| PostdeskError::Decryption(format!("Envelope is not valid JSON: {}", e)))
    }

    /// Encode to the stored string form.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)
            .map_err(|e| PostdeskError::Encryption(format!("Envelope serialization failed: {}", e)))?;
        Ok(STANDARD.encode(json))
    }
}

/// Encrypts and decrypts setting values under the derived settings key.
pub struct SettingsCipher {
    key: DerivedKey,
}

impl SettingsCipher {
    pub fn new(key: DerivedKey) -> Self {
        Self { key }
    }

    /// Fingerprint of the key in use, for diagnostics.
    pub fn key_fingerprint(&self) -> String {
        self.key.fingerprint()
    }

    fn aead(&self) -> Aes256Gcm16 {
        Aes256Gcm16::new(Key::<Aes256Gcm16>::from_slice(self.key.as_bytes()))
    }

    /// Seal `plaintext` into an envelope string.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let mut iv = [0u8; IV_LENGTH];
        OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|e| PostdeskError::Encryption(format!("IV generation failed: {}", e)))?;

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = self
            .aead()
            .encrypt_in_place_detached(Nonce::<U16>::from_slice(&iv), b"", &mut buffer)
            .map_err(|_| PostdeskError::Encryption("AES-GCM encryption failed".to_string()))?;

        Envelope {
            iv: hex::encode(iv),
            auth_tag: hex::encode(tag),
            ciphertext: hex::encode(&buffer),
        }
        .encode()
    }

    /// Open an envelope string.
    ///
    /// # Errors
    ///
    /// Returns `PostdeskError::Decryption` if the envelope is malformed, was
    /// sealed under another key, or fails authentication. Plaintext is only
    /// returned after the tag has been verified.
    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let envelope = Envelope::decode(encoded)?;

        let iv = decode_hex_field("iv", &envelope.iv)?;
        if iv.len() != IV_LENGTH {
            return Err(PostdeskError::Decryption(format!(
                "IV must be {} bytes (got {})",
                IV_LENGTH,
                iv.len()
            )));
        }
        let tag = decode_hex_field("authTag", &envelope.auth_tag)?;
        if tag.len() != TAG_LENGTH {
            return Err(PostdeskError::Decryption(format!(
                "Auth tag must be {} bytes (got {})",
                TAG_LENGTH,
                tag.len()
            )));
        }
        let mut buffer = Zeroizing::new(decode_hex_field("ciphertext", &envelope.ciphertext)?);

        self.aead()
            .decrypt_in_place_detached(
                Nonce::<U16>::from_slice(&iv),
                b"",
                buffer.as_mut_slice(),
                Tag::<U16>::from_slice(&tag),
            )
            .map_err(|_| {
                PostdeskError::Decryption(
                    "Authentication tag mismatch (wrong key or tampered value)".to_string(),
                )
            })?;

        String::from_utf8(buffer.to_vec())
            .map_err(|_| PostdeskError::Decryption("Plaintext is not valid UTF-8".to_string()))
    }
}

impl std::fmt::Debug for SettingsCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsCipher")
            .field("key", &self.key)
            .finish()
    }
}

fn decode_hex_field(name: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value)
        .map_err(|e| PostdeskError::Decryption(format!("Envelope field {} is not hex: {}", name, e)))
}
