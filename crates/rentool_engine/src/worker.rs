use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use rentool_core::{BatchContext, Operation};
use rentool_logging::{rentool_info, rentool_warn};

use crate::archive::ArchiveEngine;
use crate::batch::BatchCoordinator;
use crate::runner::{OperationRunner, RunnerSettings};
use crate::store::ProgressStore;
use crate::types::RunSummary;

/// A unit of work for the background worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Extract { archive: PathBuf, dest_dir: PathBuf },
    ExtractBatch { archives: Vec<PathBuf>, dest_dir: PathBuf },
    Create { source_dir: PathBuf, output: PathBuf },
    CreateBatch { sources: Vec<PathBuf>, output: PathBuf },
    Decompile { source_dir: PathBuf },
}

impl Job {
    pub fn operation(&self) -> Operation {
        match self {
            Job::Extract { .. } | Job::ExtractBatch { .. } => Operation::Extract,
            Job::Create { .. } | Job::CreateBatch { .. } => Operation::Create,
            Job::Decompile { .. } => Operation::Decompile,
        }
    }

    /// What a poller should know up front about this job's batch, if any.
    pub fn batch_context(&self) -> Option<BatchContext> {
        let items = match self {
            Job::ExtractBatch { archives, .. } => archives,
            Job::CreateBatch { sources, .. } => sources,
            _ => return None,
        };
        Some(BatchContext {
            total: u32::try_from(items.len()).unwrap_or(u32::MAX),
            file_names: items
                .iter()
                .map(|path| {
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default()
                })
                .collect(),
        })
    }

    /// Destination a completed extraction should be scanned under.
    pub fn extract_path(&self) -> Option<PathBuf> {
        match self {
            Job::Extract { dest_dir, .. } | Job::ExtractBatch { dest_dir, .. } => {
                Some(dest_dir.clone())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Finished(RunSummary),
}

/// Owns a background thread that runs submitted jobs one at a time.
///
/// Jobs are not mutually excluded against other writers of the same store;
/// submit from a single place.
pub struct WorkerHandle {
    job_tx: mpsc::Sender<Job>,
    event_rx: mpsc::Receiver<WorkerEvent>,
}

impl WorkerHandle {
    pub fn new(
        engine: Arc<dyn ArchiveEngine>,
        store: Arc<dyn ProgressStore>,
        settings: RunnerSettings,
    ) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (event_tx, event_rx) = mpsc::channel();
        let runner = OperationRunner::new(engine.clone(), store.clone(), settings.clone());
        let coordinator = BatchCoordinator::new(engine, store, settings);

        thread::spawn(move || {
            while let Ok(job) = job_rx.recv() {
                rentool_info!("Worker starting {} job", job.operation());
                let summary = run_job(&runner, &coordinator, job);
                if event_tx.send(WorkerEvent::Finished(summary)).is_err() {
                    rentool_warn!("Worker handle dropped; discarding run summary");
                }
            }
        });

        Self { job_tx, event_rx }
    }

    pub fn submit(&self, job: Job) {
        if self.job_tx.send(job).is_err() {
            rentool_warn!("Worker thread is gone; job not submitted");
        }
    }

    pub fn try_recv(&self) -> Option<WorkerEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn run_job(runner: &OperationRunner, coordinator: &BatchCoordinator, job: Job) -> RunSummary {
    match job {
        Job::Extract { archive, dest_dir } => runner.extract(&archive, &dest_dir),
        Job::ExtractBatch { archives, dest_dir } => coordinator.extract_all(&archives, &dest_dir),
        Job::Create { source_dir, output } => runner.create(&source_dir, &output),
        Job::CreateBatch { sources, output } => coordinator.create_from(&sources, &output),
        Job::Decompile { source_dir } => runner.decompile(&source_dir),
    }
}
