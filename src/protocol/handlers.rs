//! Command handlers for the Rax auth server.
//!
//! Each handler runs one store operation and turns its outcome into a
//! [`CommandResult`]. The caller holds the store lock for the whole call,
//! so check-then-write sequences such as signup cannot interleave.

use log::{error, info, warn};
use serde::Serialize;

use crate::auth::{
    CredentialStore, ProfileView, SignupDraft, UserRecord, ValidationErrors, format_timestamp,
    validate_signin,
};
use crate::error::AuthError;
use crate::error::handlers::{error_to_client_message, error_to_response_code};
use crate::protocol::responses::{self, format_response};
use crate::protocol::{Command, CommandResult, CommandStatus};

/// Wire view of a record. The password field never leaves the store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicRecord<'a> {
    id: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    username: &'a str,
    birthday: &'a str,
    gender: &'a str,
    created_at: String,
}

impl<'a> From<&'a UserRecord> for PublicRecord<'a> {
    fn from(record: &'a UserRecord) -> Self {
        Self {
            id: &record.id,
            first_name: &record.first_name,
            last_name: &record.last_name,
            username: &record.username,
            birthday: &record.birthday,
            gender: &record.gender,
            created_at: format_timestamp(&record.created_at),
        }
    }
}

/// Dispatches a parsed command to its handler.
pub fn handle_command(store: &mut CredentialStore, command: &Command) -> CommandResult {
    match command {
        Command::QUIT => handle_cmd_quit(),
        Command::USERS => handle_cmd_users(store),
        Command::WHOAMI => handle_cmd_whoami(store),
        Command::PROFILE => handle_cmd_profile(store),
        Command::LOGOUT => handle_cmd_logout(store),
        Command::SIGNUP(payload) => handle_cmd_signup(store, payload),
        Command::VALIDATE(payload) => handle_cmd_validate(store, payload),
        Command::SIGNIN { username, password } => handle_cmd_signin(store, username, password),
        Command::UNKNOWN => handle_cmd_unknown(),
    }
}

fn success(code: u16, message: &str) -> CommandResult {
    CommandResult {
        status: CommandStatus::Success,
        message: Some(format_response(code, message)),
    }
}

fn failure(code: u16, message: &str) -> CommandResult {
    CommandResult {
        status: CommandStatus::Failure(message.to_string()),
        message: Some(format_response(code, message)),
    }
}

fn auth_failure(err: &AuthError) -> CommandResult {
    if matches!(err, AuthError::Storage(_) | AuthError::PasswordHash(_)) {
        error!("Store operation failed: {err}");
    }
    failure(error_to_response_code(err), &error_to_client_message(err))
}

/// Serializes `value` as the reply body.
fn json_reply<T: Serialize>(code: u16, value: &T) -> CommandResult {
    match serde_json::to_string(value) {
        Ok(body) if code < 400 => success(code, &body),
        Ok(body) => failure(code, &body),
        Err(e) => {
            error!("Failed to serialize reply: {e}");
            failure(responses::LOCAL_ERROR, "Local error in processing")
        }
    }
}

fn validation_failure(errors: &ValidationErrors) -> CommandResult {
    json_reply(responses::INVALID_INPUT, errors)
}

fn parse_draft(payload: &str) -> Result<SignupDraft, CommandResult> {
    serde_json::from_str::<SignupDraft>(payload)
        .map(|draft| draft.normalized())
        .map_err(|e| {
            warn!("Rejected malformed signup draft: {e}");
            failure(responses::BAD_PARAMETERS, "Malformed signup draft")
        })
}

/// Handles QUIT: signals connection close. The stored session is
/// process-wide and survives the connection.
fn handle_cmd_quit() -> CommandResult {
    CommandResult {
        status: CommandStatus::CloseConnection,
        message: Some(format_response(responses::GOODBYE, "Goodbye")),
    }
}

fn handle_cmd_users(store: &CredentialStore) -> CommandResult {
    match store.list_users() {
        Ok(users) => {
            let public: Vec<PublicRecord<'_>> = users.iter().map(PublicRecord::from).collect();
            json_reply(responses::OK, &public)
        }
        Err(e) => auth_failure(&e),
    }
}

fn handle_cmd_whoami(store: &CredentialStore) -> CommandResult {
    match store.current_session() {
        Ok(Some(user)) => json_reply(responses::OK, &PublicRecord::from(&user)),
        Ok(None) => failure(responses::NO_SESSION, "No active session"),
        Err(e) => auth_failure(&e),
    }
}

/// Handles PROFILE: the dashboard projection of the signed-in user.
fn handle_cmd_profile(store: &CredentialStore) -> CommandResult {
    match store.current_session() {
        Ok(Some(user)) => json_reply(responses::OK, &ProfileView::from_record(&user)),
        Ok(None) => failure(responses::NO_SESSION, "No active session"),
        Err(e) => auth_failure(&e),
    }
}

/// Handles LOGOUT. Succeeds whether or not a session was active.
fn handle_cmd_logout(store: &mut CredentialStore) -> CommandResult {
    match store.logout() {
        Ok(()) => success(responses::OK, "Signed out"),
        Err(e) => auth_failure(&e),
    }
}

/// Handles SIGNUP: validates the draft, then registers it.
///
/// `CredentialStore::register` does not validate on its own, so this
/// handler is where malformed drafts are stopped.
fn handle_cmd_signup(store: &mut CredentialStore, payload: &str) -> CommandResult {
    let draft = match parse_draft(payload) {
        Ok(draft) => draft,
        Err(result) => return result,
    };

    match store.validate_signup(&draft) {
        Ok(errors) if !errors.is_empty() => {
            info!(
                "Signup for {} rejected on {} field(s)",
                draft.username,
                errors.len()
            );
            return validation_failure(&errors);
        }
        Ok(_) => {}
        Err(e) => return auth_failure(&e),
    }

    match store.register(&draft) {
        Ok(record) => json_reply(responses::CREATED, &PublicRecord::from(&record)),
        Err(e) => auth_failure(&e),
    }
}

fn handle_cmd_validate(store: &CredentialStore, payload: &str) -> CommandResult {
    let draft = match parse_draft(payload) {
        Ok(draft) => draft,
        Err(result) => return result,
    };

    match store.validate_signup(&draft) {
        Ok(errors) if errors.is_empty() => json_reply(responses::OK, &errors),
        Ok(errors) => validation_failure(&errors),
        Err(e) => auth_failure(&e),
    }
}

fn handle_cmd_signin(store: &mut CredentialStore, username: &str, password: &str) -> CommandResult {
    let errors = validate_signin(username, password);
    if !errors.is_empty() {
        return validation_failure(&errors);
    }

    match store.login(username.trim(), password) {
        Ok(user) => json_reply(responses::LOGIN_SUCCESS, &PublicRecord::from(&user)),
        Err(e) => auth_failure(&e),
    }
}

fn handle_cmd_unknown() -> CommandResult {
    failure(responses::SYNTAX_ERROR, "Unknown command")
}
