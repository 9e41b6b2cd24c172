//! Client registry
//!
//! Tracks connected clients so the server can enforce its connection limit.

use crate::client::Client;
use std::collections::HashMap;
use std::net::SocketAddr;

/// Registry for tracking active clients
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<SocketAddr, Client>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `client` unless `limit` connections are already active.
    pub fn try_insert(&mut self, client: Client, limit: usize) -> bool {
        if self.clients.len() >= limit {
            return false;
        }
        self.clients.insert(client.addr(), client);
        true
    }

    pub fn remove(&mut self, addr: &SocketAddr) -> Option<Client> {
        self.clients.remove(addr)
    }

    pub fn get_mut(&mut self, addr: &SocketAddr) -> Option<&mut Client> {
        self.clients.get_mut(addr)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
