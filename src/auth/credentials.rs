//! Password storage schemes
//!
//! `Plaintext` keeps the password exactly as entered and compares it byte
//! for byte. It exists for compatibility with stores written by the
//! browser demo and is insecure. `Argon2` stores an Argon2id PHC string
//! with a per-record random salt.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::Deserialize;

use crate::error::AuthError;

/// How passwords are stored in a [`UserRecord`](super::UserRecord).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    #[default]
    Plaintext,
    Argon2,
}

impl PasswordScheme {
    /// Produces the value persisted in the record's `password` field.
    pub fn protect(&self, password: &str) -> Result<String, AuthError> {
        match self {
            PasswordScheme::Plaintext => Ok(password.to_string()),
            PasswordScheme::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| AuthError::PasswordHash(e.to_string()))
            }
        }
    }

    /// Checks `candidate` against a stored password value.
    ///
    /// A stored value that is not a valid PHC string never matches under
    /// `Argon2`.
    pub fn verify(&self, candidate: &str, stored: &str) -> bool {
        match self {
            PasswordScheme::Plaintext => candidate == stored,
            PasswordScheme::Argon2 => PasswordHash::new(stored)
                .map(|parsed| {
                    Argon2::default()
                        .verify_password(candidate.as_bytes(), &parsed)
                        .is_ok()
                })
                .unwrap_or(false),
        }
    }
}
