//! Response handling
//!
//! Defines reply codes and formatting. Codes follow the FTP numbering the
//! protocol grew out of, plus HTTP-flavoured codes for store outcomes.

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const READY: u16 = 220;
pub const GOODBYE: u16 = 221;
pub const LOGIN_SUCCESS: u16 = 230;
pub const INVALID_INPUT: u16 = 400;
pub const NO_SESSION: u16 = 404;
pub const CONFLICT: u16 = 409;
pub const SERVICE_UNAVAILABLE: u16 = 421;
pub const LOCAL_ERROR: u16 = 451;
pub const SYNTAX_ERROR: u16 = 500;
pub const BAD_PARAMETERS: u16 = 501;
pub const AUTH_FAILED: u16 = 530;

/// Format a reply line
pub fn format_response(code: u16, message: &str) -> String {
    format!("{code} {message}\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_response_appends_crlf() {
        assert_eq!(format_response(OK, "Signed out"), "200 Signed out\r\n");
        assert_eq!(format_response(GOODBYE, "Goodbye"), "221 Goodbye\r\n");
    }
}
