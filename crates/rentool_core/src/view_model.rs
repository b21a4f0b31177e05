use std::path::PathBuf;

use crate::metrics::{format_duration, CALCULATING};
use crate::record::{Millis, Operation};

const INITIALIZING: &str = "Initializing...";

/// Immutable UI snapshot published once per poll tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUiState {
    pub operation_type: String,
    pub percentage: u8,
    /// `"processed/total"`.
    pub file_count: String,
    pub current_file: String,
    pub speed: String,
    pub eta: String,
    pub is_completed: bool,
    pub is_failed: bool,
    pub error_message: Option<String>,
    pub extract_path: Option<PathBuf>,
    /// Compiled scripts found under `extract_path` after a completed extraction.
    pub rpyc_count: usize,
    pub total_files: u64,
    pub elapsed_ms: Millis,
    pub operation: Option<Operation>,
}

impl Default for ProgressUiState {
    fn default() -> Self {
        Self {
            operation_type: INITIALIZING.to_string(),
            percentage: 0,
            file_count: "0/0".to_string(),
            current_file: INITIALIZING.to_string(),
            speed: CALCULATING.to_string(),
            eta: CALCULATING.to_string(),
            is_completed: false,
            is_failed: false,
            error_message: None,
            extract_path: None,
            rpyc_count: 0,
            total_files: 0,
            elapsed_ms: 0,
            operation: None,
        }
    }
}

impl ProgressUiState {
    pub fn is_terminal(&self) -> bool {
        self.is_completed || self.is_failed
    }

    /// One-line summary for the completion dialog.
    pub fn completion_summary(&self) -> String {
        format!(
            "Processed {} files in {}",
            self.total_files,
            format_duration(self.elapsed_ms)
        )
    }

    pub(crate) fn current_file_or_placeholder(current_file: &str) -> String {
        if current_file.is_empty() {
            INITIALIZING.to_string()
        } else {
            current_file.to_string()
        }
    }
}
