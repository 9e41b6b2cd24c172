//! Error handlers
//!
//! Provides error logging and reply-code translation.

use crate::error::types::{AuthError, ServerError, StorageError};
use crate::protocol::responses;
use log::error;

/// Log a server error
pub fn handle_error(err: &ServerError) {
    error!("Auth Server Error: {}", err);
}

/// Convert an auth error to a reply code
pub fn error_to_response_code(err: &AuthError) -> u16 {
    match err {
        AuthError::DuplicateUsername(_) => responses::CONFLICT,
        AuthError::InvalidCredentials => responses::AUTH_FAILED,
        AuthError::Storage(e) => storage_error_to_response_code(e),
        AuthError::PasswordHash(_) => responses::LOCAL_ERROR,
    }
}

fn storage_error_to_response_code(err: &StorageError) -> u16 {
    match err {
        StorageError::Io { .. } | StorageError::Corrupt { .. } | StorageError::Serialize(_) => {
            responses::LOCAL_ERROR
        }
    }
}

/// Message sent to the client for an auth error.
///
/// Storage and hashing failures are reported generically so internal
/// paths never reach the wire.
pub fn error_to_client_message(err: &AuthError) -> String {
    match err {
        AuthError::DuplicateUsername(_) | AuthError::InvalidCredentials => err.to_string(),
        AuthError::Storage(_) | AuthError::PasswordHash(_) => {
            "Local error in processing".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_for_store_errors() {
        assert_eq!(
            error_to_response_code(&AuthError::DuplicateUsername("alice".into())),
            409
        );
        assert_eq!(error_to_response_code(&AuthError::InvalidCredentials), 530);
        assert_eq!(
            error_to_response_code(&AuthError::PasswordHash("boom".into())),
            451
        );
    }

    #[test]
    fn test_client_messages_hide_internal_detail() {
        let err = AuthError::PasswordHash("salt encoding failed".into());
        assert_eq!(error_to_client_message(&err), "Local error in processing");
        assert_eq!(
            error_to_client_message(&AuthError::InvalidCredentials),
            "Invalid username or password"
        );
    }
}
