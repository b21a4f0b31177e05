use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Milliseconds since the Unix epoch.
pub type Millis = u64;

/// Which kind of work a record reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Extract,
    Create,
    Decompile,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Extract => "extract",
            Operation::Create => "create",
            Operation::Decompile => "decompile",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run status. `Completed` and `Failed` are terminal until the store is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Idle,
    #[default]
    InProgress,
    Completed,
    Failed,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::Failed)
    }
}

/// The single current snapshot of an operation.
///
/// Field names serialize in camelCase so that a foreign engine writing the
/// same slot produces a compatible document. Every field except `operation`
/// has a default, so partial documents still parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub operation: Operation,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub start_time: Millis,
    #[serde(default)]
    pub last_update_time: Millis,
    #[serde(default)]
    pub total_files: u64,
    #[serde(default)]
    pub processed_files: u64,
    #[serde(default)]
    pub current_file: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub current_batch_index: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_batch_count: u32,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub current_batch_file_name: Option<String>,
}

impl ProgressRecord {
    /// An `in_progress` record with zero counts, started at `start_time`.
    pub fn in_progress(
        operation: Operation,
        start_time: Millis,
        now: Millis,
        current_file: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            status: Status::InProgress,
            start_time,
            last_update_time: now,
            total_files: 0,
            processed_files: 0,
            current_file: current_file.into(),
            error_message: None,
            current_batch_index: 0,
            total_batch_count: 0,
            current_batch_file_name: None,
        }
    }

    /// A terminal `completed` record reporting `files` of `files` processed.
    pub fn completed(operation: Operation, start_time: Millis, now: Millis, files: u64) -> Self {
        Self {
            status: Status::Completed,
            total_files: files,
            processed_files: files,
            ..Self::in_progress(operation, start_time, now, "Complete")
        }
    }

    /// A terminal `failed` record carrying a human-readable message.
    pub fn failed(
        operation: Operation,
        start_time: Millis,
        now: Millis,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status: Status::Failed,
            error_message: Some(message.into()),
            ..Self::in_progress(operation, start_time, now, "")
        }
    }

    pub fn with_counts(mut self, processed_files: u64, total_files: u64) -> Self {
        self.processed_files = processed_files;
        self.total_files = total_files;
        self
    }

    /// Annotates the record with its position inside a batch (1-indexed).
    pub fn with_batch(mut self, index: u32, total: u32, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        self.current_batch_index = index;
        self.total_batch_count = total;
        self.current_batch_file_name = (!file_name.is_empty()).then_some(file_name);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_batch(&self) -> bool {
        self.total_batch_count > 0
    }

    pub fn elapsed_ms(&self) -> Millis {
        self.last_update_time.saturating_sub(self.start_time)
    }
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

// Foreign writers emit "" rather than omitting the key.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.is_empty()))
}
