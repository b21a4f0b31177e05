mod common;

use pretty_assertions::assert_eq;
use rentool_core::{Operation, ProgressRecord, Status};
use rentool_engine::{ProgressSink, RunReporter};

use common::{scratch, RecordingStore};

fn untidy_engine_record() -> ProgressRecord {
    let mut record = ProgressRecord::in_progress(Operation::Decompile, 0, 0, "screens.rpyc")
        .with_counts(4, 10)
        .with_batch(7, 9, "stray.rpa");
    record.status = Status::Idle;
    record.error_message = Some("not an error yet".to_string());
    record
}

#[test]
fn engine_records_are_normalised_in_a_single_run() {
    let temp = scratch();
    let store = RecordingStore::new(temp.path());
    let reporter = RunReporter::begin(store.as_ref(), Operation::Extract);

    reporter.report(&untidy_engine_record());

    let writes = store.writes();
    assert_eq!(writes.len(), 1);
    let record = &writes[0];
    assert_eq!(record.operation, Operation::Extract);
    assert_eq!(record.status, Status::InProgress);
    assert_eq!(record.start_time, reporter.start_time());
    assert_eq!(record.error_message, None);
    assert_eq!(record.current_batch_index, 0);
    assert_eq!(record.total_batch_count, 0);
    assert_eq!(record.current_batch_file_name, None);
    assert_eq!((record.processed_files, record.total_files), (4, 10));
}

#[test]
fn engine_records_take_the_current_batch_item() {
    let temp = scratch();
    let store = RecordingStore::new(temp.path());
    let reporter = RunReporter::begin(store.as_ref(), Operation::Extract);
    reporter.set_item(2, 3, "b.rpa");

    reporter.report(&untidy_engine_record());

    let record = store.writes().pop().unwrap();
    assert_eq!(record.status, Status::InProgress);
    assert_eq!(record.current_batch_index, 2);
    assert_eq!(record.total_batch_count, 3);
    assert_eq!(record.current_batch_file_name.as_deref(), Some("b.rpa"));
    assert_eq!(record.error_message, None);
}

#[test]
fn engine_terminal_records_are_withheld() {
    let temp = scratch();
    let store = RecordingStore::new(temp.path());
    let reporter = RunReporter::begin(store.as_ref(), Operation::Create);

    reporter.report(&ProgressRecord::completed(Operation::Create, 0, 0, 5));
    reporter.report(&ProgressRecord::failed(Operation::Create, 0, 0, "boom"));

    assert!(store.terminal_writes().is_empty());
    reporter.complete(5);
    assert_eq!(store.terminal_writes().len(), 1);
}
