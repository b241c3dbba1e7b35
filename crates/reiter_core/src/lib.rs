//! Reiter core: pure run/progress/credential state machine and view-model helpers.
mod effect;
mod ledger;
mod msg;
mod progress;
mod relay;
mod run;
mod session;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use ledger::{LedgerError, ProgressItem, ProgressLedger};
pub use msg::Msg;
pub use progress::{ProgressBarEvent, ProgressBarKind, ProgressBarMessage, ProgressId};
pub use relay::{
    CredentialRelay, CredentialSubject, Prompt, PromptKind, RelayAction, RelayError,
    BULK_ARGUMENTS_RESPONSE, LOGIN_FAILED_TEXT,
};
pub use run::{QueuedRun, RunController, RunGeneration, RunRequest};
pub use session::RunSession;
pub use state::AppState;
pub use update::update;
pub use view_model::{format_bytes, AppViewModel, BarFill, ProgressBarView, PromptView};
