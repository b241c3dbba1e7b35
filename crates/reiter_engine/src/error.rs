use thiserror::Error;

/// Why a sync run settled with an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Sattel reported an exception and stopped.
    #[error("{exception}: {message}")]
    Backend { exception: String, message: String },
    #[error("failed to launch sattel: {0}")]
    Launch(String),
    #[error("sattel i/o failed: {0}")]
    Io(String),
}
