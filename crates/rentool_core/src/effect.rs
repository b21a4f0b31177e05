use std::path::PathBuf;

use crate::ProgressUiState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver a snapshot to the presentation layer.
    Publish(ProgressUiState),
    /// Count compiled scripts under `dir`, then answer with `Msg::ScriptsCounted`.
    CountScripts { dir: PathBuf },
    /// A terminal record was observed; issue no further reads.
    StopPolling,
}
