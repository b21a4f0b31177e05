use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rentool_core::Millis;
use rentool_logging::{rentool_debug, rentool_warn};
use tempfile::TempDir;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("failed to create temporary directory: {0}")]
    Create(#[source] io::Error),
    #[error("failed to copy {path:?}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read {path:?}: {message}")]
    Walk { path: PathBuf, message: String },
    #[error("source has no file name: {0:?}")]
    NoName(PathBuf),
    #[error("more than one source is named {0}")]
    Duplicate(String),
}

/// Temporary directory that collects packing sources into one tree.
///
/// Removed when dropped, whichever way the run ends.
#[derive(Debug)]
pub struct StagingDir {
    dir: Option<TempDir>,
}

impl StagingDir {
    /// Creates `{root}/rpa_batch_temp_{stamp}XXXXXX`.
    pub fn create_in(root: &Path, stamp: Millis) -> Result<Self, StagingError> {
        fs::create_dir_all(root).map_err(StagingError::Create)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("rpa_batch_temp_{stamp}"))
            .tempdir_in(root)
            .map_err(StagingError::Create)?;
        rentool_debug!("Created staging directory {:?}", dir.path());
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => Path::new(""),
        }
    }

    /// Copies a file or a whole directory tree to `{staging}/{file name of source}`.
    ///
    /// Symlinks are followed, so linked directories are copied as real ones.
    pub fn stage(&self, source: &Path) -> Result<PathBuf, StagingError> {
        let name = source
            .file_name()
            .ok_or_else(|| StagingError::NoName(source.to_path_buf()))?;
        let dest = self.path().join(name);
        if dest.exists() {
            return Err(StagingError::Duplicate(name.to_string_lossy().into_owned()));
        }

        for entry in WalkDir::new(source).follow_links(true) {
            let entry = entry.map_err(|err| StagingError::Walk {
                path: source.to_path_buf(),
                message: err.to_string(),
            })?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|err| StagingError::Walk {
                    path: entry.path().to_path_buf(),
                    message: err.to_string(),
                })?;
            let target = if relative.as_os_str().is_empty() {
                dest.clone()
            } else {
                dest.join(relative)
            };

            let copy_err = |source| StagingError::Copy {
                path: entry.path().to_path_buf(),
                source,
            };
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(copy_err)?;
            } else {
                fs::copy(entry.path(), &target).map_err(copy_err)?;
            }
        }
        Ok(dest)
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => rentool_debug!("Removed staging directory {:?}", path),
            Err(err) => rentool_warn!("Failed to remove staging directory {:?}: {}", path, err),
        }
    }
}
