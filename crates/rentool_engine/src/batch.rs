use std::path::{Path, PathBuf};
use std::sync::Arc;

use rentool_core::Operation;
use rentool_logging::{rentool_error, rentool_info};

use crate::archive::ArchiveEngine;
use crate::runner::{call_engine, settle, RunnerSettings};
use crate::sink::RunReporter;
use crate::staging::StagingDir;
use crate::store::ProgressStore;
use crate::types::{OperationError, RunSummary};

/// Runs N sub-operations under one aggregate progress stream.
///
/// Fail-fast: the first failing item ends the batch with a terminal `failed`
/// record naming that item; earlier items are neither rolled back nor
/// reported separately.
#[derive(Clone)]
pub struct BatchCoordinator {
    engine: Arc<dyn ArchiveEngine>,
    store: Arc<dyn ProgressStore>,
    settings: RunnerSettings,
}

impl BatchCoordinator {
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

    /// Extracts every archive into `dest_dir`, one after another.
    pub fn extract_all(&self, archives: &[PathBuf], dest_dir: &Path) -> RunSummary {
        let reporter = RunReporter::begin(self.store.as_ref(), Operation::Extract);
        let total = batch_len(archives);
        rentool_info!("Batch extracting {} archives into {:?}", total, dest_dir);

        for (index, archive) in (1..).zip(archives) {
            let name = display_name(archive);
            reporter.set_item(index, total, name.clone());
            reporter.progress("Starting extraction...");

            let result = call_engine(|| self.engine.extract(archive, dest_dir, &reporter));
            if let Err(err) = settle(result) {
                return fail_item(&reporter, index, total, &name, &err);
            }
        }

        reporter.complete(u64::from(total));
        rentool_info!("Batch extraction of {} archives complete", total);
        RunSummary::completed(Operation::Extract, format!("Extracted {total} archives"))
    }

    /// Packs every source (file or directory) into a single archive at `output`.
    ///
    /// The engine builds from one directory, so sources are first copied into
    /// a staging directory that is removed on every exit path.
    pub fn create_from(&self, sources: &[PathBuf], output: &Path) -> RunSummary {
        let reporter = RunReporter::begin(self.store.as_ref(), Operation::Create);
        let total = batch_len(sources);
        rentool_info!("Batch packing {} sources into {:?}", total, output);

        let staging_root = &self.settings.staging_root;
        let staging = match StagingDir::create_in(staging_root, reporter.start_time()) {
            Ok(staging) => staging,
            Err(err) => {
                let err = OperationError::from(err);
                rentool_error!("Staging failed: {}", err);
                reporter.fail(&format!("Error: {err}"));
                return RunSummary::failed(Operation::Create, format!("Creation failed: {err}"));
            }
        };

        for (index, source) in (1..).zip(sources) {
            let name = display_name(source);
            reporter.set_item(index, total, name.clone());
            reporter.progress(&format!("Copying to temp: {name}"));

            if let Err(err) = staging.stage(source) {
                return fail_item(&reporter, index, total, &name, &err.into());
            }
        }

        if total > 0 {
            reporter.set_item(total, total, "Creating final archive...");
        }
        reporter.progress(&format!("Building RPA from {total} items"));

        let archive = self.settings.archive;
        let result =
            call_engine(|| self.engine.create(staging.path(), output, archive, &reporter));
        match settle(result) {
            Ok(outcome) => {
                let count = outcome.files.len();
                reporter.complete(count as u64);
                rentool_info!("Created {:?} with {} files from {} sources", output, count, total);
                RunSummary::completed(
                    Operation::Create,
                    format!("Created archive with {count} files from {total} sources"),
                )
            }
            Err(err) => {
                rentool_error!("Building {:?} failed: {}", output, err);
                reporter.fail(&format!("Error: {err}"));
                RunSummary::failed(Operation::Create, format!("Creation failed: {err}"))
            }
        }
    }
}

fn fail_item(
    reporter: &RunReporter<'_>,
    index: u32,
    total: u32,
    name: &str,
    err: &OperationError,
) -> RunSummary {
    rentool_error!("Batch item {}/{} ({}) failed: {}", index, total, name, err);
    reporter.fail(&format!("Error on file {index}/{total}: {err}"));
    RunSummary::failed(
        reporter.operation(),
        format!("Failed on {name} ({index}/{total}): {err}"),
    )
}

fn batch_len(items: &[PathBuf]) -> u32 {
    u32::try_from(items.len()).unwrap_or(u32::MAX)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
