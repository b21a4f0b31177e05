use std::path::PathBuf;

use crate::metrics::{format_eta, format_speed, Metrics};
use crate::record::{Operation, ProgressRecord, Status};
use crate::view_model::ProgressUiState;

/// What the launching side knows about a batch before the first record exists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchContext {
    pub total: u32,
    pub file_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum Phase {
    #[default]
    Polling,
    /// Terminal record seen; waiting for the compiled-script count.
    AwaitingCount,
    Finished,
}

/// Poller-side state, owned by a single poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerState {
    batch: Option<BatchContext>,
    extract_path: Option<PathBuf>,
    batch_index: u32,
    last_status: Status,
    view: ProgressUiState,
    pub(crate) phase: Phase,
}

impl Default for PollerState {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl PollerState {
    pub fn new(batch: Option<BatchContext>, extract_path: Option<PathBuf>) -> Self {
        let view = ProgressUiState {
            extract_path: extract_path.clone(),
            ..ProgressUiState::default()
        };
        Self {
            batch,
            extract_path,
            batch_index: 1,
            last_status: Status::InProgress,
            view,
            phase: Phase::Polling,
        }
    }

    pub fn view(&self) -> ProgressUiState {
        self.view.clone()
    }

    /// Batch index as tracked by the poller (1-indexed, never above the batch total).
    pub fn batch_index(&self) -> u32 {
        self.batch_index
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub(crate) fn extract_path(&self) -> Option<&PathBuf> {
        self.extract_path.as_ref()
    }

    pub(crate) fn set_rpyc_count(&mut self, count: usize) {
        self.view.rpyc_count = count;
    }

    /// Folds a freshly read record into the cached view.
    pub(crate) fn observe(&mut self, record: &ProgressRecord) {
        let batch_total = self.batch_total(record);
        if batch_total > 0 {
            self.track_batch_index(record, batch_total);
        }

        let metrics = Metrics::derive(record);
        let mut operation_type = operation_label(record).to_string();
        if batch_total > 0 {
            operation_type.push_str(&format!(" ({} of {})", self.batch_index, batch_total));
            if let Some(name) = self.batch_file_name(record) {
                operation_type.push('\n');
                operation_type.push_str(&name);
            }
        }

        self.view = ProgressUiState {
            operation_type,
            percentage: metrics.percentage,
            file_count: format!("{}/{}", record.processed_files, record.total_files),
            current_file: ProgressUiState::current_file_or_placeholder(&record.current_file),
            speed: format_speed(metrics.files_per_second),
            eta: format_eta(metrics.eta_ms),
            is_completed: record.status == Status::Completed,
            is_failed: record.status == Status::Failed,
            error_message: record.error_message.clone(),
            extract_path: self.extract_path.clone(),
            rpyc_count: 0,
            total_files: record.total_files,
            elapsed_ms: metrics.elapsed_ms,
            operation: Some(record.operation),
        };
    }

    fn batch_total(&self, record: &ProgressRecord) -> u32 {
        self.batch
            .as_ref()
            .map(|batch| batch.total)
            .filter(|total| *total > 0)
            .unwrap_or(record.total_batch_count)
    }

    // The store only reflects the latest write, so a finished sub-item shows
    // up as an in_progress -> completed edge. The reported index wins when it
    // is already past the advance.
    fn track_batch_index(&mut self, record: &ProgressRecord, total: u32) {
        let mut index = self.batch_index;
        if record.status == Status::Completed
            && self.last_status == Status::InProgress
            && index < total
        {
            index += 1;
        }
        self.batch_index = index.max(record.current_batch_index.min(total));
        self.last_status = record.status;
    }

    fn batch_file_name(&self, record: &ProgressRecord) -> Option<String> {
        let position = usize::try_from(self.batch_index).ok()?.checked_sub(1)?;
        self.batch
            .as_ref()
            .and_then(|batch| batch.file_names.get(position).cloned())
            .or_else(|| record.current_batch_file_name.clone())
    }
}

fn operation_label(record: &ProgressRecord) -> &'static str {
    let copying = record.current_file.to_lowercase().contains("copy");
    match (copying, record.operation) {
        (true, Operation::Extract) => "Copying files to destination...",
        (true, _) => "Copying archive to destination...",
        (false, Operation::Extract) => "Extracting RPA...",
        (false, Operation::Decompile) => "Decompiling RPYC...",
        (false, Operation::Create) => "Creating RPA Archive...",
    }
}
