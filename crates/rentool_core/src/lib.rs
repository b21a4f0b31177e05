//! Rentool core: progress record model, metric derivation and the pure poller state machine.
mod effect;
mod metrics;
mod msg;
mod record;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use metrics::{
    eta_ms, files_per_second, format_duration, format_eta, format_speed, percentage, Metrics,
    CALCULATING,
};
pub use msg::Msg;
pub use record::{Millis, Operation, ProgressRecord, Status};
pub use state::{BatchContext, PollerState};
pub use update::update;
pub use view_model::ProgressUiState;
