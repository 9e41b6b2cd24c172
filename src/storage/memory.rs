//! In-memory adapter

use std::collections::HashMap;

use super::{Slot, StorageAdapter};
use crate::error::StorageError;

/// Adapter backed by a `HashMap`; contents vanish with the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryAdapter {
    slots: HashMap<Slot, String>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageAdapter for MemoryAdapter {
    fn read(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(&slot).cloned())
    }

    fn write(&mut self, slot: Slot, value: &str) -> Result<(), StorageError> {
        self.slots.insert(slot, value.to_string());
        Ok(())
    }

    fn clear(&mut self, slot: Slot) -> Result<(), StorageError> {
        self.slots.remove(&slot);
        Ok(())
    }
}
