use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::middleware::logging::log_command;
use crate::protocol::responses::{self, format_response};
use crate::protocol::{Command, CommandStatus, handle_command, parse_command};
use crate::server::SharedState;

/// One line read from a client, bounded by the command length limit.
#[derive(Debug, PartialEq)]
enum LineRead {
    Line(String),
    TooLong,
    NotUtf8,
    Closed,
}

/// Reads one line, never buffering more than `max_len + 1` bytes of it.
///
/// An overlong line is skipped up to and including its newline so the
/// next read starts on a fresh command.
async fn read_command_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_len: usize,
) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let limit = u64::try_from(max_len).unwrap_or(u64::MAX).saturating_add(1);
    let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if n == 0 {
        return Ok(LineRead::Closed);
    }

    if buf.len() > max_len {
        if !buf.ends_with(b"\n") {
            discard_rest_of_line(reader).await?;
        }
        return Ok(LineRead::TooLong);
    }

    match String::from_utf8(std::mem::take(buf)) {
        Ok(line) => Ok(LineRead::Line(line)),
        Err(_) => Ok(LineRead::NotUtf8),
    }
}

async fn discard_rest_of_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (used, done) = {
            let available = reader.fill_buf().await?;
            match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), available.is_empty()),
            }
        };
        reader.consume(used);
        if done {
            return Ok(());
        }
    }
}

/// Handles a registered client's session using the Tokio runtime.
///
/// - Reads one command per line, at most `max_command_length` bytes each.
/// - Throttles `SIGNIN` per peer address.
/// - Dispatches through `handle_command` with the store lock held.
/// - Removes the client from the registry when the loop ends.
pub async fn handle_client(cmd_stream: TcpStream, client_addr: SocketAddr, state: SharedState) {
    let (read_half, mut write_half) = cmd_stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut buf = Vec::new();
    // Rate limit by IP so reconnecting does not reset the count.
    let peer = client_addr.ip().to_string();
    let addr_label = client_addr.to_string();

    loop {
        match read_command_line(&mut reader, &mut buf, state.max_command_length).await {
            Ok(LineRead::Closed) => {
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(LineRead::TooLong) => {
                warn!("Dropped overlong command from {}", client_addr);
                let reply = format_response(responses::SYNTAX_ERROR, "Command too long");
                if write_half.write_all(reply.as_bytes()).await.is_err() {
                    break;
                }
            }
            Ok(LineRead::NotUtf8) => {
                let reply = format_response(responses::SYNTAX_ERROR, "Command is not valid UTF-8");
                if write_half.write_all(reply.as_bytes()).await.is_err() {
                    break;
                }
            }
            Ok(LineRead::Line(line)) => {
                let command = parse_command(&line);
                log_command(&addr_label, &command);

                if let Some(client) = state.clients.lock().await.get_mut(&client_addr) {
                    client.record_command();
                }

                if matches!(command, Command::SIGNIN { .. }) && !signin_allowed(&state, &peer).await
                {
                    warn!("Sign-in rate limit hit for {}", peer);
                    let reply = format_response(
                        responses::SERVICE_UNAVAILABLE,
                        "Too many sign-in attempts. Try again later.",
                    );
                    if write_half.write_all(reply.as_bytes()).await.is_err() {
                        break;
                    }
                    continue;
                }

                let result = {
                    let mut store = state.store.lock().await;
                    handle_command(&mut store, &command)
                };

                if let Some(msg) = &result.message {
                    if let Err(e) = write_half.write_all(msg.as_bytes()).await {
                        error!("Failed to write to {}: {}", client_addr, e);
                        break;
                    }
                }

                if result.status == CommandStatus::CloseConnection {
                    info!("Client {} requested to quit", client_addr);
                    break;
                }
            }
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        }
    }

    if let Some(client) = state.clients.lock().await.remove(&client_addr) {
        info!(
            "Client {} disconnected after {:?} ({} commands)",
            client_addr,
            client.connected_for(),
            client.commands_handled()
        );
    }
}

/// Applies the current runtime limits, then records the attempt.
async fn signin_allowed(state: &SharedState, peer: &str) -> bool {
    let (max_attempts, window) = {
        let runtime = state.runtime.read().await;
        (runtime.max_signin_attempts, runtime.signin_window())
    };

    let mut limiter = state.limiter.lock().await;
    limiter.reconfigure(max_attempts, window);
    limiter.is_allowed(peer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_lines_within_limit() {
        let mut reader = BufReader::new(&b"USERS\r\nWHOAMI\r\n"[..]);
        let mut buf = Vec::new();

        assert_eq!(
            read_command_line(&mut reader, &mut buf, 64).await.unwrap(),
            LineRead::Line("USERS\r\n".to_string())
        );
        assert_eq!(
            read_command_line(&mut reader, &mut buf, 64).await.unwrap(),
            LineRead::Line("WHOAMI\r\n".to_string())
        );
        assert_eq!(
            read_command_line(&mut reader, &mut buf, 64).await.unwrap(),
            LineRead::Closed
        );
    }

    #[tokio::test]
    async fn test_overlong_line_is_skipped_without_buffering_it() {
        let mut input = vec![b'A'; 100_000];
        input.extend_from_slice(b"\r\nQUIT\r\n");
        let mut reader = BufReader::new(&input[..]);
        let mut buf = Vec::new();

        assert_eq!(
            read_command_line(&mut reader, &mut buf, 64).await.unwrap(),
            LineRead::TooLong
        );
        assert!(buf.len() <= 65);
        assert_eq!(
            read_command_line(&mut reader, &mut buf, 64).await.unwrap(),
            LineRead::Line("QUIT\r\n".to_string())
        );
    }

    #[tokio::test]
    async fn test_unterminated_overlong_input_ends_at_eof() {
        let input = vec![b'A'; 10_000];
        let mut reader = BufReader::new(&input[..]);
        let mut buf = Vec::new();

        assert_eq!(
            read_command_line(&mut reader, &mut buf, 64).await.unwrap(),
            LineRead::TooLong
        );
        assert_eq!(
            read_command_line(&mut reader, &mut buf, 64).await.unwrap(),
            LineRead::Closed
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_reported() {
        let mut reader = BufReader::new(&b"SIGNIN \xff\xfe\r\n"[..]);
        let mut buf = Vec::new();

        assert_eq!(
            read_command_line(&mut reader, &mut buf, 64).await.unwrap(),
            LineRead::NotUtf8
        );
    }
}
