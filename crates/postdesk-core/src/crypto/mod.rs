//! Cryptographic operations for Postdesk settings.
//!
//! - **Key derivation**: PBKDF2-HMAC-SHA256 over the host identity, so no
//!   key file has to be stored
//! - **Envelopes**: AES-256-GCM with a fresh 16-byte IV per value
//! - **Hashing**: salted PBKDF2 hashes with constant-time verification
//! - **Redaction**: masking of secret-looking fields before logging
//!
//! ## Threat Model
//!
//! We defend against:
//! - Casual inspection of the settings database (API keys are not plaintext)
//! - Silent tampering with stored envelopes (authentication tag check)
//!
//! We do NOT defend against:
//! - Any local process running as the same user on the same host, which can
//!   re-derive the key from the same identity inputs
//! - Compromised OS / memory access
//!
//! The key is bound to hostname and OS user name. Renaming either makes
//! previously encrypted values unreadable.

pub mod cipher;
pub mod hash;
pub mod identity;
pub mod key;
pub mod redact;

pub use cipher::{Envelope, SettingsCipher};
pub use hash::{constant_time_eq, generate_secure_random, hash_secret, verify_hash, HashedSecret};
pub use identity::HostIdentity;
pub use key::{derive_key, DerivedKey};
pub use redact::{is_sensitive_field, redact_for_logging, REDACTED};
