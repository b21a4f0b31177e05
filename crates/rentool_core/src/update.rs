use crate::state::Phase;
use crate::{Effect, Msg, Operation, PollerState, Status};

/// Pure update function: applies a poll result to the poller state and returns any effects.
pub fn update(mut state: PollerState, msg: Msg) -> (PollerState, Vec<Effect>) {
    let effects = match msg {
        Msg::Snapshot(record) => {
            if state.phase != Phase::Polling {
                return (state, Vec::new());
            }
            // An idle record carries no run; treat it like an empty slot.
            let Some(record) = record.filter(|record| record.status != Status::Idle) else {
                return (state, Vec::new());
            };

            state.observe(&record);
            if !record.is_terminal() {
                vec![Effect::Publish(state.view())]
            } else {
                let count_dir = (record.status == Status::Completed
                    && record.operation == Operation::Extract)
                    .then(|| state.extract_path().cloned())
                    .flatten();
                match count_dir {
                    Some(dir) => {
                        state.phase = Phase::AwaitingCount;
                        vec![Effect::CountScripts { dir }]
                    }
                    None => {
                        state.phase = Phase::Finished;
                        vec![Effect::Publish(state.view()), Effect::StopPolling]
                    }
                }
            }
        }
        Msg::ScriptsCounted(count) => {
            if state.phase != Phase::AwaitingCount {
                return (state, Vec::new());
            }
            state.set_rpyc_count(count);
            state.phase = Phase::Finished;
            vec![Effect::Publish(state.view()), Effect::StopPolling]
        }
    };

    (state, effects)
}
