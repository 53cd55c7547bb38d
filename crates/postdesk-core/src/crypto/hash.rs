//! Salted PBKDF2 hashing with constant-time verification.

use std::fmt;

use hmac::Hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::error::{PostdeskError, Result};

/// PBKDF2 rounds for stored hashes.
pub const HASH_ITERATIONS: u32 = 100_000;

/// Hash output length in bytes (hex doubles it).
pub const HASH_LENGTH: usize = 64;

/// Random salt length in bytes when none is supplied.
pub const SALT_LENGTH: usize = 32;

/// A hex hash together with the salt that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedSecret {
    pub hash: String,
    pub salt: String,
}

/// Hash `data` with PBKDF2-HMAC-SHA256.
///
/// When `salt` is `None` a fresh random salt is generated. The salt string is
/// used as-is (its UTF-8 bytes), so a stored salt reproduces the same hash.
pub fn hash_secret(data: &str, salt: Option<&str>) -> Result<HashedSecret> {
    let salt = match salt {
        Some(salt) => salt.to_string(),
        None => generate_secure_random(SALT_LENGTH)?,
    };

    let mut output = [0u8; HASH_LENGTH];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(data.as_bytes(), salt.as_bytes(), HASH_ITERATIONS, &mut output)
        .map_err(hashing_failed)?;

    Ok(HashedSecret {
        hash: hex::encode(output),
        salt,
    })
}

// KeyDerivation is reserved for the settings key.
fn hashing_failed(err: impl fmt::Display) -> PostdeskError {
    PostdeskError::Encryption(format!("PBKDF2 hashing failed: {}", err))
}

/// Check `data` against a stored hash and salt.
///
/// Returns `false` (never an error) when hashing fails, so a broken entry
/// cannot be mistaken for a match.
pub fn verify_hash(data: &str, hash: &str, salt: &str) -> bool {
    match hash_secret(data, Some(salt)) {
        Ok(computed) => constant_time_eq(hash.as_bytes(), computed.hash.as_bytes()),
        Err(_) => false,
    }
}

/// Compare two byte strings without short-circuiting on the first mismatch.
///
/// Only the length check returns early; lengths are not secret here.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// `length` random bytes from the OS RNG, hex-encoded.
pub fn generate_secure_random(length: usize) -> Result<String> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| PostdeskError::Encryption(format!("Random generation failed: {}", e)))?;
    Ok(hex::encode(bytes))
}
