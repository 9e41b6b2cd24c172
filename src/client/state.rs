//! Module `client`
//!
//! Per-connection bookkeeping. Authentication state is not kept here: the
//! signed-in user lives in the credential store and is shared by every
//! connection.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// A connected client.
#[derive(Debug, Clone)]
pub struct Client {
    addr: SocketAddr,
    connected_at: Instant,
    commands_handled: u64,
}

impl Client {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connected_at: Instant::now(),
            commands_handled: 0,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn connected_for(&self) -> Duration {
        self.connected_at.elapsed()
    }

    pub fn commands_handled(&self) -> u64 {
        self.commands_handled
    }

    pub fn record_command(&mut self) {
        self.commands_handled += 1;
    }
}
