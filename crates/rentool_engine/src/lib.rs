//! Rentool engine: progress store, run drivers and the poll loop.
mod archive;
mod batch;
mod clock;
mod persist;
mod poller;
mod runner;
mod scan;
mod sink;
mod staging;
mod store;
mod types;
mod worker;

pub use archive::{
    ArchiveEngine, ArchiveOutcome, ArchiveSettings, DecompileOutcome, DecompileStats, EngineError,
    DEFAULT_ARCHIVE_KEY, DEFAULT_ARCHIVE_VERSION,
};
pub use batch::BatchCoordinator;
pub use clock::now_millis;
pub use persist::{ensure_store_dir, AtomicFileWriter, PersistError};
pub use poller::{PollExit, PollSettings, Poller, DEFAULT_POLL_INTERVAL};
pub use runner::{OperationRunner, RunnerSettings};
pub use scan::count_rpyc_files;
pub use sink::{ProgressSink, RunReporter};
pub use staging::{StagingDir, StagingError};
pub use store::{
    clear_best_effort, write_best_effort, FileProgressStore, ProgressStore, StoreError,
    PROGRESS_FILE,
};
pub use types::{OperationError, RunSummary, NO_RESULT_MESSAGE};
pub use worker::{Job, WorkerEvent, WorkerHandle};
