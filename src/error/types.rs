//! Error types
//!
//! Defines domain-specific error types for each module of the auth server.

use std::io;

use thiserror::Error;

use crate::storage::Slot;

/// Authentication module errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already exists")]
    DuplicateUsername(String),

    /// Deliberately silent about whether the username or the password was wrong.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

/// Storage module errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on slot {slot}: {source}")]
    Io {
        slot: Slot,
        #[source]
        source: io::Error,
    },

    #[error("Slot {slot} holds unreadable data: {source}")]
    Corrupt {
        slot: Slot,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize records: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// General server error that encompasses all error types
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
