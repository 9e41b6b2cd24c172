//! Server core functionality
//!
//! This module contains the listener, the accept loop and the state shared
//! by every connection.

pub mod core;

pub use self::core::{Server, SharedState};
