//! Contract of the archive engine collaborator.
//!
//! The engine itself (RPA extraction/packing, RPYC decompilation) lives on the
//! other side of a binding and is opaque here. Implementations report
//! fine-grained progress through the sink they are handed.

use std::path::Path;

use thiserror::Error;

use crate::sink::ProgressSink;

/// Archive format version passed to `create`.
pub const DEFAULT_ARCHIVE_VERSION: u32 = 3;
/// Obfuscation key passed to `create`.
pub const DEFAULT_ARCHIVE_KEY: u32 = 0xDEAD_BEEF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSettings {
    pub version: u32,
    pub key: u32,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            version: DEFAULT_ARCHIVE_VERSION,
            key: DEFAULT_ARCHIVE_KEY,
        }
    }
}

/// Result of `extract` or `create`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArchiveOutcome {
    pub success: bool,
    pub files: Vec<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecompileStats {
    pub total: u32,
    pub success: u32,
    pub skipped: u32,
    pub failed: u32,
}

/// Result of `decompile`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecompileOutcome {
    pub success: bool,
    pub message: String,
    pub stats: DecompileStats,
}

/// The engine call raised instead of returning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Synchronous capability interface over the archive engine.
///
/// `Ok(None)` stands for a binding that produced no value at all; callers
/// treat it as a failure, never as success.
pub trait ArchiveEngine: Send + Sync {
    fn extract(
        &self,
        archive: &Path,
        dest_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<Option<ArchiveOutcome>, EngineError>;

    fn create(
        &self,
        source_dir: &Path,
        output: &Path,
        settings: ArchiveSettings,
        sink: &dyn ProgressSink,
    ) -> Result<Option<ArchiveOutcome>, EngineError>;

    fn decompile(
        &self,
        source_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<Option<DecompileOutcome>, EngineError>;
}
