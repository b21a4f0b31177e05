use crate::ProgressRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Result of one poll tick; `None` when the store held no readable record.
    Snapshot(Option<ProgressRecord>),
    /// Compiled-script scan of the extract path finished.
    ScriptsCounted(usize),
}
