mod common;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use rentool_core::{BatchContext, Operation, ProgressRecord};
use rentool_engine::{FileProgressStore, PollExit, PollSettings, Poller, ProgressStore};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use common::scratch;

fn fast(settings: PollSettings) -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(10),
        ..settings
    }
}

#[tokio::test]
async fn terminal_record_ends_the_loop_without_clearing() {
    let temp = scratch();
    let store = Arc::new(FileProgressStore::in_dir(temp.path()));
    let failed = ProgressRecord::failed(Operation::Extract, 0, 100, "Error: truncated archive");
    store.write(&failed).unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let exit = Poller::new(store.clone(), fast(PollSettings::default()))
        .run(tx, CancellationToken::new())
        .await;

    let view = rx.recv().await.unwrap();
    assert!(view.is_failed);
    assert_eq!(view.error_message.as_deref(), Some("Error: truncated archive"));
    assert_eq!(exit, PollExit::Terminal(view));
    assert!(rx.recv().await.is_none());
    assert_eq!(store.read(), Some(failed));
}

#[tokio::test]
async fn follows_a_live_run_with_non_decreasing_percentage() {
    let temp = scratch();
    let store = Arc::new(FileProgressStore::in_dir(temp.path()));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let poller = Poller::new(store.clone(), fast(PollSettings::default()))
        .spawn(tx, CancellationToken::new());

    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for processed in 0..=10u64 {
                let now = 1_000 + processed * 100;
                let record = ProgressRecord::in_progress(Operation::Decompile, 0, now, "x.rpyc")
                    .with_counts(processed, 10);
                store.write(&record).unwrap();
                tokio::time::sleep(Duration::from_millis(15)).await;
            }
            store
                .write(&ProgressRecord::completed(Operation::Decompile, 0, 2_500, 10))
                .unwrap();
        })
    };

    let mut previous = 0;
    let mut last = None;
    while let Some(view) = rx.recv().await {
        assert!(view.percentage >= previous);
        assert!(view.percentage <= 100);
        previous = view.percentage;
        last = Some(view);
    }
    writer.await.unwrap();

    let last = last.unwrap();
    assert!(last.is_completed);
    assert_eq!(last.percentage, 100);
    assert_eq!(last.completion_summary(), "Processed 10 files in 2s");
    assert!(matches!(poller.await.unwrap(), PollExit::Terminal(_)));
}

#[tokio::test]
async fn completed_extraction_publishes_compiled_script_count() {
    let temp = scratch();
    let extract_dir = temp.path().join("game");
    fs::create_dir_all(extract_dir.join("scripts")).unwrap();
    fs::write(extract_dir.join("script.rpyc"), "").unwrap();
    fs::write(extract_dir.join("scripts").join("gui.RPYC"), "").unwrap();
    fs::write(extract_dir.join("scripts").join("gui.rpy"), "").unwrap();

    let store = Arc::new(FileProgressStore::in_dir(&temp.path().join("store")));
    store
        .write(
            &ProgressRecord::completed(Operation::Extract, 0, 3_000, 2).with_batch(2, 2, "b.rpa"),
        )
        .unwrap();

    let settings = fast(PollSettings {
        batch: Some(BatchContext {
            total: 2,
            file_names: vec!["a.rpa".into(), "b.rpa".into()],
        }),
        extract_path: Some(extract_dir.clone()),
        ..PollSettings::default()
    });
    let (tx, mut rx) = mpsc::unbounded_channel();
    Poller::new(store, settings).run(tx, CancellationToken::new()).await;

    let view = rx.recv().await.unwrap();
    assert!(view.is_completed);
    assert_eq!(view.rpyc_count, 2);
    assert_eq!(view.operation_type, "Extracting RPA... (2 of 2)\nb.rpa");
    assert_eq!(view.extract_path, Some(extract_dir));
}

#[tokio::test]
async fn absent_record_keeps_polling_until_cancelled() {
    let temp = scratch();
    let store = Arc::new(FileProgressStore::in_dir(temp.path()));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let handle = Poller::new(store, fast(PollSettings::default())).spawn(tx, cancel.clone());

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    assert_eq!(handle.await.unwrap(), PollExit::Cancelled);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn dropped_receiver_detaches_the_poller() {
    let temp = scratch();
    let store = Arc::new(FileProgressStore::in_dir(temp.path()));
    store
        .write(&ProgressRecord::in_progress(Operation::Create, 0, 10, "Starting creation..."))
        .unwrap();

    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    let exit = Poller::new(store, fast(PollSettings::default()))
        .run(tx, CancellationToken::new())
        .await;
    assert_eq!(exit, PollExit::Detached);
}
