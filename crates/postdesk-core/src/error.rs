//! Error types for Postdesk core operations.
//!
//! Read paths in the settings store swallow these errors and fall back to
//! defaults; write paths return them to the caller. The CLI layer maps them
//! to user-facing messages.

use thiserror::Error;

/// Result type alias for Postdesk operations.
pub type Result<T> = std::result::Result<T, PostdeskError>;

/// Core error type for Postdesk operations.
#[derive(Debug, Error)]
pub enum PostdeskError {
    /// The settings key could not be derived; encryption is unavailable
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// A value could not be encrypted or hashed
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// An envelope was malformed, tampered with, or sealed under another key
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// The persistence backend rejected a read or write
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backup payload is not a settings backup
    #[error("Invalid backup format: {0}")]
    InvalidBackupFormat(String),

    /// Some entries of a bulk import could not be written
    #[error("Import incomplete: {applied} applied, failed keys: {}", .failed.join(", "))]
    PartialImport { applied: usize, failed: Vec<String> },

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<rusqlite::Error> for PostdeskError {
    fn from(err: rusqlite::Error) -> Self {
        PostdeskError::Persistence(format!("SQLite error: {}", err))
    }
}

impl From<std::io::Error> for PostdeskError {
    fn from(err: std::io::Error) -> Self {
        PostdeskError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for PostdeskError {
    fn from(err: serde_json::Error) -> Self {
        PostdeskError::Serialization(err.to_string())
    }
}
