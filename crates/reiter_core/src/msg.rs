use crate::{CredentialSubject, ProgressBarMessage, RunGeneration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked to sync one crawler, or all of them for `None`.
    SyncRequested { crawler: Option<String> },
    /// Several crawlers requested at once; they share one run when idle.
    SyncManyRequested { crawlers: Vec<String> },
    /// User clicked Cancel.
    CancelClicked,
    /// The backend start command settled, normally or with an error.
    SyncSettled {
        generation: RunGeneration,
        outcome: Result<(), String>,
    },
    /// Backend began processing the named crawler.
    CrawlStarted {
        generation: RunGeneration,
        crawler: String,
    },
    /// Backend progress bar lifecycle event.
    ProgressBar {
        generation: RunGeneration,
        message: ProgressBarMessage,
    },
    /// Backend needs a value and waits for exactly one response.
    CredentialRequested {
        generation: RunGeneration,
        subject: CredentialSubject,
    },
    /// Backend rejected the last supplied credential.
    LoginFailed { generation: RunGeneration },
    /// User edited the open prompt.
    PromptInputChanged(String),
    /// User confirmed the open prompt.
    PromptSubmitted,
    /// User closed the open prompt without answering.
    PromptCancelled,
    /// User dismissed the login failure banner.
    LoginErrorDismissed,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
