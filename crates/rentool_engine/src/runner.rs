use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rentool_core::Operation;
use rentool_logging::{rentool_error, rentool_info};

use crate::archive::{ArchiveEngine, ArchiveOutcome, ArchiveSettings, DecompileOutcome, EngineError};
use crate::sink::RunReporter;
use crate::store::ProgressStore;
use crate::types::{OperationError, RunSummary};

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub archive: ArchiveSettings,
    /// Parent of the temporary staging directories used when packing batches.
    pub staging_root: PathBuf,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            archive: ArchiveSettings::default(),
            staging_root: std::env::temp_dir(),
        }
    }
}

/// Drives one engine call per run: clear, initial `in_progress`, engine
/// progress, exactly one terminal record.
#[derive(Clone)]
pub struct OperationRunner {
    engine: Arc<dyn ArchiveEngine>,
    store: Arc<dyn ProgressStore>,
    settings: RunnerSettings,
}

impl OperationRunner {
    pub fn new(
        engine: Arc<dyn ArchiveEngine>,
        store: Arc<dyn ProgressStore>,
        settings: RunnerSettings,
    ) -> Self {
        Self {
            engine,
            store,
            settings,
        }
    }

    pub fn extract(&self, archive: &Path, dest_dir: &Path) -> RunSummary {
        let reporter = RunReporter::begin(self.store.as_ref(), Operation::Extract);
        rentool_info!("Extracting {:?} into {:?}", archive, dest_dir);
        reporter.progress("Starting extraction...");

        let result = call_engine(|| self.engine.extract(archive, dest_dir, &reporter));
        match settle(result) {
            Ok(outcome) => {
                let count = outcome.files.len();
                reporter.complete(count as u64);
                rentool_info!("Extracted {} files from {:?}", count, archive);
                RunSummary::completed(Operation::Extract, format!("Extracted {count} files"))
            }
            Err(err) => fail_single(&reporter, "Extraction", &err),
        }
    }

    pub fn create(&self, source_dir: &Path, output: &Path) -> RunSummary {
        let reporter = RunReporter::begin(self.store.as_ref(), Operation::Create);
        rentool_info!("Creating {:?} from {:?}", output, source_dir);
        reporter.progress("Starting creation...");

        let archive = self.settings.archive;
        let result = call_engine(|| self.engine.create(source_dir, output, archive, &reporter));
        match settle(result) {
            Ok(outcome) => {
                let count = outcome.files.len();
                reporter.complete(count as u64);
                rentool_info!("Created {:?} with {} files", output, count);
                RunSummary::completed(
                    Operation::Create,
                    format!("Created archive with {count} files"),
                )
            }
            Err(err) => fail_single(&reporter, "Creation", &err),
        }
    }

    pub fn decompile(&self, source_dir: &Path) -> RunSummary {
        let reporter = RunReporter::begin(self.store.as_ref(), Operation::Decompile);
        rentool_info!("Decompiling scripts under {:?}", source_dir);
        reporter.progress("Starting decompilation...");

        let result = call_engine(|| self.engine.decompile(source_dir, &reporter));
        match settle(result) {
            Ok(outcome) => {
                let stats = outcome.stats;
                reporter.complete(u64::from(stats.total));
                rentool_info!("Decompile finished: {:?}", stats);
                RunSummary::completed(
                    Operation::Decompile,
                    format!(
                        "Decompiled {} files ({} success, {} skipped, {} failed)",
                        stats.total, stats.success, stats.skipped, stats.failed
                    ),
                )
            }
            Err(err) => fail_single(&reporter, "Decompilation", &err),
        }
    }
}

fn fail_single(reporter: &RunReporter<'_>, label: &str, err: &OperationError) -> RunSummary {
    rentool_error!("{} failed: {}", label, err);
    reporter.fail(&format!("Error: {err}"));
    RunSummary::failed(reporter.operation(), format!("{label} failed: {err}"))
}

/// An engine answer that may still report failure in-band.
pub(crate) trait EngineReply {
    fn rejection(&self) -> Option<String>;
}

impl EngineReply for ArchiveOutcome {
    fn rejection(&self) -> Option<String> {
        (!self.success).then(|| {
            self.message
                .clone()
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| "the archive engine reported failure".to_string())
        })
    }
}

impl EngineReply for DecompileOutcome {
    fn rejection(&self) -> Option<String> {
        (!self.success).then(|| {
            if self.message.is_empty() {
                "the decompiler reported failure".to_string()
            } else {
                self.message.clone()
            }
        })
    }
}

/// Folds the three engine failure shapes (raised, no value, `success = false`) into one error.
pub(crate) fn settle<T: EngineReply>(
    result: Result<Option<T>, EngineError>,
) -> Result<T, OperationError> {
    let reply = result?.ok_or(OperationError::NoResult)?;
    match reply.rejection() {
        Some(message) => Err(OperationError::Rejected(message)),
        None => Ok(reply),
    }
}

/// Runs an engine call, turning a panic inside the binding into an `EngineError`.
pub(crate) fn call_engine<T>(
    call: impl FnOnce() -> Result<Option<T>, EngineError>,
) -> Result<Option<T>, EngineError> {
    panic::catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|payload| {
        Err(EngineError::new(format!(
            "the archive engine panicked: {}",
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
