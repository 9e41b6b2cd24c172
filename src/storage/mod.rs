//! Key-value persistence
//!
//! The credential store reads and writes serialized values through a
//! [`StorageAdapter`] with two keyed slots.

pub mod filesystem;
pub mod memory;

use std::fmt;

use crate::error::StorageError;

pub use filesystem::FileAdapter;
pub use memory::MemoryAdapter;

/// A keyed slot in the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Serialized sequence of every user record.
    Users,
    /// Serialized record of the signed-in user, absent when signed out.
    CurrentUser,
}

impl Slot {
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Users => "users",
            Slot::CurrentUser => "currentUser",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Persistence boundary of the credential store.
///
/// `read` returns `Ok(None)` for a slot that was never written or has been
/// cleared. A successful `write` replaces the whole slot value.
pub trait StorageAdapter: Send {
    fn read(&self, slot: Slot) -> Result<Option<String>, StorageError>;

    fn write(&mut self, slot: Slot, value: &str) -> Result<(), StorageError>;

    fn clear(&mut self, slot: Slot) -> Result<(), StorageError>;
}
