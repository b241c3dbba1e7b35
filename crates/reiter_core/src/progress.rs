/// Identifier of one progress bar, unique for the lifetime of a run.
pub type ProgressId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBarKind {
    Download,
    Crawl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressBarEvent {
    Begin { kind: ProgressBarKind, path: String },
    Advance { progress: u64 },
    SetTotal { total: u64 },
    Done,
}

/// One lifecycle event for the bar identified by `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressBarMessage {
    pub id: ProgressId,
    pub event: ProgressBarEvent,
}

impl ProgressBarMessage {
    pub fn new(id: ProgressId, event: ProgressBarEvent) -> Self {
        Self { id, event }
    }
}
