use std::fmt;

use rentool_core::{Operation, Status};
use thiserror::Error;

use crate::archive::EngineError;
use crate::staging::StagingError;

/// Fixed diagnostic for an engine call that produced no value.
pub const NO_RESULT_MESSAGE: &str = "the archive engine returned no result";

/// Every way a run can fail. The Display text becomes the record's `errorMessage`.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("{0}")]
    Engine(#[from] EngineError),
    #[error("{}", NO_RESULT_MESSAGE)]
    NoResult,
    /// The engine answered with `success = false`.
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Staging(#[from] StagingError),
}

/// Human-readable outcome of a run, for the launching side's status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub operation: Operation,
    pub status: Status,
    pub message: String,
}

impl RunSummary {
    pub(crate) fn completed(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            status: Status::Completed,
            message: message.into(),
        }
    }

    pub(crate) fn failed(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            status: Status::Failed,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Completed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
