//! Client management system
//!
//! Handles client connections, connection bookkeeping, and the per-client
//! command loop.

pub mod handler;
pub mod registry;
pub mod state;

pub use handler::handle_client;
pub use registry::ClientRegistry;
pub use state::Client;
