use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rentool_core::ProgressRecord;
use rentool_logging::{rentool_debug, rentool_trace, rentool_warn};
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

/// Well-known file name of the progress slot inside the store directory.
pub const PROGRESS_FILE: &str = "operation_progress.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize progress record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to persist progress record: {0}")]
    Persist(#[from] PersistError),
}

/// Durable single-slot holder of the current progress record.
///
/// One writer and one reader at a time; the two sides may live in different
/// processes. `read` never fails: anything it cannot parse is reported as no
/// record.
pub trait ProgressStore: Send + Sync {
    /// Resets the slot so that a following `read` returns `None`.
    fn clear(&self) -> Result<(), StoreError>;
    /// Fully replaces the slot. A concurrent reader sees the old or the new record.
    fn write(&self, record: &ProgressRecord) -> Result<(), StoreError>;
    fn read(&self) -> Option<ProgressRecord>;
}

/// Writes a record, logging instead of failing: progress is advisory.
pub fn write_best_effort(store: &dyn ProgressStore, record: &ProgressRecord) {
    if let Err(err) = store.write(record) {
        rentool_warn!(
            "Failed to write {} progress ({:?}): {}",
            record.operation,
            record.status,
            err
        );
    }
}

/// Clears the slot, logging instead of failing.
pub fn clear_best_effort(store: &dyn ProgressStore) {
    if let Err(err) = store.clear() {
        rentool_warn!("Failed to clear progress store: {}", err);
    }
}

/// JSON file store, replaced by write-then-rename.
#[derive(Debug, Clone)]
pub struct FileProgressStore {
    writer: AtomicFileWriter,
}

impl FileProgressStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(path),
        }
    }

    /// Store at `{dir}/operation_progress.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(PROGRESS_FILE))
    }

    /// Address handed to out-of-process writers.
    pub fn path(&self) -> &Path {
        self.writer.target()
    }
}

impl ProgressStore for FileProgressStore {
    fn clear(&self) -> Result<(), StoreError> {
        self.writer.remove()?;
        rentool_debug!("Cleared progress store at {:?}", self.path());
        Ok(())
    }

    fn write(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        let content = serde_json::to_vec(record)?;
        self.writer.write(&content)?;
        rentool_trace!(
            "Wrote progress {:?} {}/{} to {:?}",
            record.status,
            record.processed_files,
            record.total_files,
            self.path()
        );
        Ok(())
    }

    fn read(&self) -> Option<ProgressRecord> {
        let bytes = match fs::read(self.path()) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                rentool_warn!("Failed to read progress from {:?}: {}", self.path(), err);
                return None;
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        match serde_json::from_slice(&bytes) {
            Ok(record) => Some(record),
            Err(err) => {
                rentool_warn!("Ignoring unreadable progress at {:?}: {}", self.path(), err);
                None
            }
        }
    }
}
