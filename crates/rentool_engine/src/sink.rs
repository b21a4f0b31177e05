use std::sync::{Mutex, PoisonError};

use rentool_core::{Millis, Operation, ProgressRecord, Status};
use rentool_logging::rentool_debug;

use crate::clock::now_millis;
use crate::store::{clear_best_effort, write_best_effort, ProgressStore};

/// Where the archive engine reports its progress.
pub trait ProgressSink: Send + Sync {
    fn report(&self, record: &ProgressRecord);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BatchItem {
    index: u32,
    total: u32,
    name: String,
}

#[derive(Debug, Default)]
struct ReporterState {
    item: Option<BatchItem>,
    finished: bool,
}

/// The only writer of one run.
///
/// Stamps every record with the run's operation, its start time and, inside a
/// batch, the current item. Engine writes go through [`ProgressSink`] and are
/// forwarded only while in progress; the single terminal record comes from
/// [`RunReporter::complete`] or [`RunReporter::fail`], after which every write
/// is dropped.
pub struct RunReporter<'a> {
    store: &'a dyn ProgressStore,
    operation: Operation,
    start_time: Millis,
    state: Mutex<ReporterState>,
}

impl<'a> RunReporter<'a> {
    /// Clears the store so a stale terminal record is never read as this run's.
    pub fn begin(store: &'a dyn ProgressStore, operation: Operation) -> Self {
        clear_best_effort(store);
        Self {
            store,
            operation,
            start_time: now_millis(),
            state: Mutex::new(ReporterState::default()),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn start_time(&self) -> Millis {
        self.start_time
    }

    /// Moves the batch cursor; `index` is 1-based.
    pub fn set_item(&self, index: u32, total: u32, name: impl Into<String>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.item = Some(BatchItem {
            index,
            total,
            name: name.into(),
        });
    }

    /// Driver-authored `in_progress` write with per-item counts reset.
    pub fn progress(&self, current_file: &str) {
        let now = now_millis();
        let record =
            ProgressRecord::in_progress(self.operation, self.start_time, now, current_file);
        self.write_stamped(record);
    }

    pub fn complete(&self, files: u64) {
        let now = now_millis();
        let record = ProgressRecord::completed(self.operation, self.start_time, now, files);
        self.finish(record);
    }

    pub fn fail(&self, message: &str) {
        let now = now_millis();
        let record = ProgressRecord::failed(self.operation, self.start_time, now, message);
        self.finish(record);
    }

    fn finish(&self, record: ProgressRecord) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.finished {
            rentool_debug!("Run already terminal; dropping {:?} record", record.status);
            return;
        }
        state.finished = true;
        let record = stamp(record, state.item.as_ref());
        write_best_effort(self.store, &record);
    }

    fn write_stamped(&self, record: ProgressRecord) {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.finished {
            rentool_debug!("Run already terminal; dropping progress write");
            return;
        }
        let record = stamp(record, state.item.as_ref());
        write_best_effort(self.store, &record);
    }
}

impl ProgressSink for RunReporter<'_> {
    fn report(&self, record: &ProgressRecord) {
        if record.is_terminal() {
            rentool_debug!(
                "Withholding engine-reported {:?}; the run reports its own outcome",
                record.status
            );
            return;
        }
        let mut record = record.clone();
        record.operation = self.operation;
        record.status = Status::InProgress;
        record.start_time = self.start_time;
        record.error_message = None;
        record.current_batch_index = 0;
        record.total_batch_count = 0;
        record.current_batch_file_name = None;
        if record.last_update_time < self.start_time {
            record.last_update_time = now_millis();
        }
        self.write_stamped(record);
    }
}

fn stamp(record: ProgressRecord, item: Option<&BatchItem>) -> ProgressRecord {
    match item {
        Some(item) => record.with_batch(item.index, item.total, item.name.clone()),
        None => record,
    }
}
