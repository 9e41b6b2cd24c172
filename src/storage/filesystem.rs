//! Filesystem adapter
//!
//! Keeps each slot in its own `<key>.json` file under a storage directory.
//! Writes go to a temporary file first and are renamed over the slot file
//! on success, so a reader never observes a half-written slot.

use std::fs::{self, File, remove_file, rename};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, error};

use super::{Slot, StorageAdapter};
use crate::error::StorageError;

/// Adapter persisting slots as JSON files in a directory.
#[derive(Debug, Clone)]
pub struct FileAdapter {
    root: PathBuf,
}

impl FileAdapter {
    /// The directory is created on first write, not here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, slot: Slot) -> PathBuf {
        self.root.join(format!("{}.json", slot.key()))
    }

    fn temp_path(&self, slot: Slot) -> PathBuf {
        self.root.join(format!("{}.json.tmp", slot.key()))
    }
}

impl StorageAdapter for FileAdapter {
    fn read(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { slot, source }),
        }
    }

    fn write(&mut self, slot: Slot, value: &str) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io { slot, source };

        fs::create_dir_all(&self.root).map_err(io_err)?;

        let temp_path = self.temp_path(slot);
        let final_path = self.slot_path(slot);

        let written = File::create(&temp_path).and_then(|mut file| {
            file.write_all(value.as_bytes())?;
            file.sync_all()
        });

        if let Err(e) = written {
            error!("Failed to write temporary slot file {}: {e}", temp_path.display());
            let _ = remove_file(&temp_path);
            return Err(io_err(e));
        }

        if let Err(e) = rename(&temp_path, &final_path) {
            error!("Failed to replace slot file {}: {e}", final_path.display());
            let _ = remove_file(&temp_path);
            return Err(io_err(e));
        }

        debug!("Slot {slot} written to {}", final_path.display());
        Ok(())
    }

    fn clear(&mut self, slot: Slot) -> Result<(), StorageError> {
        match remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { slot, source }),
        }
    }
}
