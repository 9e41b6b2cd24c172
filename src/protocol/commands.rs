//! Module `commands`
//!
//! Defines the command parsing logic and the data structures used to
//! represent commands, their status and their results.

/// A command parsed from a client line.
///
/// Commands that need arguments carry them; a known command sent without
/// its argument parses as `UNKNOWN`.
#[derive(Debug, PartialEq)]
pub enum Command {
    QUIT,
    USERS,
    WHOAMI,
    PROFILE,
    LOGOUT,
    SIGNUP(String),   // JSON signup draft
    VALIDATE(String), // JSON signup draft, checked without registering
    SIGNIN { username: String, password: String },
    UNKNOWN,
}

/// Represents the outcome status of executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Struct encapsulating the full result of a command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

/// Parses a raw line received from a client into a [`Command`].
///
/// The verb is case-insensitive. For `SIGNIN` the first word is the
/// username and everything after the single separator that follows it is
/// the password, kept byte for byte so it matches what `SIGNUP` stored.
/// The password may be empty so the handler can report it as missing.
pub fn parse_command(raw: &str) -> Command {
    let line = raw.trim_end_matches(['\r', '\n']).trim_start();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let cmd = verb.to_ascii_uppercase();
    let arg = rest.trim();

    match cmd.as_str() {
        "QUIT" | "Q" => Command::QUIT,
        "USERS" => Command::USERS,
        "WHOAMI" => Command::WHOAMI,
        "PROFILE" => Command::PROFILE,
        "LOGOUT" => Command::LOGOUT,
        "SIGNUP" if !arg.is_empty() => Command::SIGNUP(arg.to_string()),
        "VALIDATE" if !arg.is_empty() => Command::VALIDATE(arg.to_string()),
        "SIGNIN" if !arg.is_empty() => {
            let credentials = rest.trim_start();
            let (username, password) = credentials
                .split_once(char::is_whitespace)
                .unwrap_or((credentials, ""));
            Command::SIGNIN {
                username: username.to_string(),
                password: password.to_string(),
            }
        }
        _ => Command::UNKNOWN,
    }
}
