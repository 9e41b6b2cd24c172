//! Logging middleware
//!
//! Request logging that keeps credentials out of the log.

use log::info;

use crate::protocol::Command;

/// Log a client connection
pub fn log_connection(client_addr: &str) {
    info!("Client connected: {}", client_addr);
}

/// Log a client command
pub fn log_command(client_addr: &str, command: &Command) {
    info!("Client {} executed: {}", client_addr, describe_command(command));
}

/// Loggable form of a command, with passwords and draft payloads elided.
pub fn describe_command(command: &Command) -> String {
    match command {
        Command::SIGNIN { username, .. } => format!("SIGNIN {username} ****"),
        Command::SIGNUP(_) => "SIGNUP <draft>".to_string(),
        Command::VALIDATE(_) => "VALIDATE <draft>".to_string(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_command_hides_secrets() {
        let signin = Command::SIGNIN {
            username: "johndoe".into(),
            password: "password123".into(),
        };
        assert_eq!(describe_command(&signin), "SIGNIN johndoe ****");

        let signup = Command::SIGNUP(r#"{"password":"password123"}"#.into());
        assert!(!describe_command(&signup).contains("password123"));

        assert_eq!(describe_command(&Command::WHOAMI), "WHOAMI");
    }
}
