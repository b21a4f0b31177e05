use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rentool_core::{update, BatchContext, Effect, Msg, PollerState, ProgressRecord, ProgressUiState};
use rentool_logging::{rentool_debug, rentool_warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::scan::count_rpyc_files;
use crate::store::ProgressStore;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    pub batch: Option<BatchContext>,
    /// Scanned for compiled scripts once an extraction completes.
    pub extract_path: Option<PathBuf>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            batch: None,
            extract_path: None,
        }
    }
}

/// Why a poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollExit {
    /// A terminal record was observed; carries the last published snapshot.
    Terminal(ProgressUiState),
    Cancelled,
    /// The snapshot receiver was dropped.
    Detached,
}

/// Client-side loop turning the store into a stream of UI snapshots.
///
/// Never clears the store and never signals the worker.
pub struct Poller {
    store: Arc<dyn ProgressStore>,
    settings: PollSettings,
}

impl Poller {
    pub fn new(store: Arc<dyn ProgressStore>, settings: PollSettings) -> Self {
        Self { store, settings }
    }

    pub fn spawn(
        self,
        updates: mpsc::UnboundedSender<ProgressUiState>,
        cancel: CancellationToken,
    ) -> JoinHandle<PollExit> {
        tokio::spawn(self.run(updates, cancel))
    }

    pub async fn run(
        self,
        updates: mpsc::UnboundedSender<ProgressUiState>,
        cancel: CancellationToken,
    ) -> PollExit {
        let mut state = PollerState::new(
            self.settings.batch.clone(),
            self.settings.extract_path.clone(),
        );
        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    rentool_debug!("Poller cancelled");
                    return PollExit::Cancelled;
                }
                _ = ticker.tick() => {}
            }

            let mut inbox = vec![Msg::Snapshot(self.read().await)];
            let mut stop = false;
            while let Some(msg) = inbox.pop() {
                let (next, effects) = update(state, msg);
                state = next;
                for effect in effects {
                    match effect {
                        Effect::Publish(view) => {
                            if updates.send(view).is_err() {
                                rentool_debug!("Snapshot receiver dropped; poller exiting");
                                return PollExit::Detached;
                            }
                        }
                        Effect::CountScripts { dir } => {
                            inbox.push(Msg::ScriptsCounted(count_scripts(dir).await));
                        }
                        Effect::StopPolling => stop = true,
                    }
                }
            }

            if stop {
                return PollExit::Terminal(state.view());
            }
        }
    }

    async fn read(&self) -> Option<ProgressRecord> {
        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || store.read()).await {
            Ok(record) => record,
            Err(err) => {
                rentool_warn!("Progress read task failed: {}", err);
                None
            }
        }
    }
}

async fn count_scripts(dir: PathBuf) -> usize {
    match tokio::task::spawn_blocking(move || count_rpyc_files(&dir)).await {
        Ok(count) => count,
        Err(err) => {
            rentool_warn!("Compiled-script scan failed: {}", err);
            0
        }
    }
}
