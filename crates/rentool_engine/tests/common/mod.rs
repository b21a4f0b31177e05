#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rentool_core::{Operation, ProgressRecord, Status};
use rentool_engine::{
    ArchiveEngine, ArchiveOutcome, ArchiveSettings, DecompileOutcome, DecompileStats,
    EngineError, FileProgressStore, ProgressSink, ProgressStore, StoreError,
};
use tempfile::TempDir;
use walkdir::WalkDir;

/// What the fake engine does on its next call.
#[derive(Debug, Clone)]
pub enum Script {
    Succeed { files: usize },
    Reject(&'static str),
    Raise(&'static str),
    NoResult,
    Panic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Extract { archive: PathBuf, dest_dir: PathBuf },
    Create {
        staged: Vec<String>,
        output: PathBuf,
        settings: ArchiveSettings,
    },
    Decompile { source_dir: PathBuf },
}

/// Scripted engine: each call pops the next script, defaulting to success.
#[derive(Default)]
pub struct FakeEngine {
    scripts: Mutex<VecDeque<Script>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeEngine {
    pub fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn next_script(&self) -> Script {
        self.scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Succeed { files: 2 })
    }

    fn play(
        &self,
        operation: Operation,
        sink: &dyn ProgressSink,
    ) -> Result<Option<usize>, EngineError> {
        match self.next_script() {
            Script::Succeed { files } => {
                let total = files as u64;
                for done in 1..=total {
                    let current = format!("file_{done}.rpyc");
                    let record = ProgressRecord::in_progress(operation, 0, 0, current)
                        .with_counts(done, total);
                    sink.report(&record);
                }
                // Engines report their own completion; the run must not forward it.
                sink.report(&ProgressRecord::completed(operation, 0, 0, total));
                Ok(Some(files))
            }
            Script::Reject(message) => Err(EngineError::new(format!("__reject__{message}"))),
            Script::Raise(message) => Err(EngineError::new(message)),
            Script::NoResult => Ok(None),
            Script::Panic => panic!("binding exploded"),
        }
    }

    fn archive_outcome(
        &self,
        operation: Operation,
        sink: &dyn ProgressSink,
    ) -> Result<Option<ArchiveOutcome>, EngineError> {
        match self.play(operation, sink) {
            Ok(Some(files)) => Ok(Some(ArchiveOutcome {
                success: true,
                files: (0..files).map(|i| format!("file_{i}")).collect(),
                message: None,
            })),
            Ok(None) => Ok(None),
            Err(err) => match err.0.strip_prefix("__reject__") {
                Some(message) => Ok(Some(ArchiveOutcome {
                    success: false,
                    files: Vec::new(),
                    message: Some(message.to_string()),
                })),
                None => Err(err),
            },
        }
    }
}

impl ArchiveEngine for FakeEngine {
    fn extract(
        &self,
        archive: &Path,
        dest_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<Option<ArchiveOutcome>, EngineError> {
        self.calls.lock().unwrap().push(Call::Extract {
            archive: archive.to_path_buf(),
            dest_dir: dest_dir.to_path_buf(),
        });
        self.archive_outcome(Operation::Extract, sink)
    }

    fn create(
        &self,
        source_dir: &Path,
        output: &Path,
        settings: ArchiveSettings,
        sink: &dyn ProgressSink,
    ) -> Result<Option<ArchiveOutcome>, EngineError> {
        self.calls.lock().unwrap().push(Call::Create {
            staged: list_tree(source_dir),
            output: output.to_path_buf(),
            settings,
        });
        self.archive_outcome(Operation::Create, sink)
    }

    fn decompile(
        &self,
        source_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<Option<DecompileOutcome>, EngineError> {
        self.calls.lock().unwrap().push(Call::Decompile {
            source_dir: source_dir.to_path_buf(),
        });
        match self.play(Operation::Decompile, sink) {
            Ok(Some(files)) => {
                let total = files as u32;
                Ok(Some(DecompileOutcome {
                    success: true,
                    message: "done".to_string(),
                    stats: DecompileStats {
                        total,
                        success: total.saturating_sub(1),
                        skipped: u32::from(total > 0),
                        failed: 0,
                    },
                }))
            }
            Ok(None) => Ok(None),
            Err(err) => match err.0.strip_prefix("__reject__") {
                Some(message) => Ok(Some(DecompileOutcome {
                    success: false,
                    message: message.to_string(),
                    stats: DecompileStats::default(),
                })),
                None => Err(err),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Clear,
    Write(ProgressRecord),
}

/// File store that also remembers every clear and write, in order.
pub struct RecordingStore {
    inner: FileProgressStore,
    events: Mutex<Vec<StoreEvent>>,
}

impl RecordingStore {
    pub fn new(dir: &Path) -> Arc<Self> {
        Arc::new(Self {
            inner: FileProgressStore::in_dir(dir),
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<ProgressRecord> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                StoreEvent::Write(record) => Some(record),
                StoreEvent::Clear => None,
            })
            .collect()
    }

    pub fn terminal_writes(&self) -> Vec<ProgressRecord> {
        self.writes()
            .into_iter()
            .filter(|record| record.status.is_terminal())
            .collect()
    }
}

impl ProgressStore for RecordingStore {
    fn clear(&self) -> Result<(), StoreError> {
        self.events.lock().unwrap().push(StoreEvent::Clear);
        self.inner.clear()
    }

    fn write(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        self.events.lock().unwrap().push(StoreEvent::Write(record.clone()));
        self.inner.write(record)
    }

    fn read(&self) -> Option<ProgressRecord> {
        self.inner.read()
    }
}

/// Asserts the run-level protocol: clear first, in-progress writes, one terminal write last.
pub fn assert_single_terminal(store: &RecordingStore, expected: Status) -> ProgressRecord {
    let events = store.events();
    assert_eq!(events.first(), Some(&StoreEvent::Clear), "run must clear first");
    let writes = store.writes();
    let terminal = store.terminal_writes();
    assert_eq!(terminal.len(), 1, "expected exactly one terminal write: {writes:#?}");
    let last = writes.last().cloned().expect("at least one write");
    assert_eq!(last.status, expected);
    assert_eq!(last, terminal[0]);
    last
}

pub fn list_tree(root: &Path) -> Vec<String> {
    let mut entries: Vec<String> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .ok()
                .map(|path| path.to_string_lossy().replace('\\', "/"))
        })
        .collect();
    entries.sort();
    entries
}

pub fn scratch() -> TempDir {
    rentool_logging::initialize_for_tests();
    TempDir::new().unwrap()
}
