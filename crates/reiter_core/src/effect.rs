use crate::{RunGeneration, RunRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start one backend sync job; its events must carry `generation`.
    StartSync {
        generation: RunGeneration,
        request: RunRequest,
    },
    /// Answer the backend's pending request.
    Respond { value: String },
    /// Advisory stop signal for the active run.
    Cancel,
}
