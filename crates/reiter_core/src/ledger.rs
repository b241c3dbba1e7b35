use std::collections::BTreeMap;

use thiserror::Error;

use crate::{ProgressBarEvent, ProgressBarKind, ProgressBarMessage, ProgressId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressItem {
    pub kind: ProgressBarKind,
    pub path: String,
    pub progress: u64,
    /// `None` until the backend reports a total; may stay unknown forever.
    pub total: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("progress bar {0} already began")]
    DuplicateId(ProgressId),
    #[error("progress bar {0} is not running")]
    UnknownId(ProgressId),
}

/// Folds progress bar events of one run into running and finished bars.
///
/// `running` and `finished` never share an id. Only download bars are kept
/// once done; crawl bars are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressLedger {
    running: BTreeMap<ProgressId, ProgressItem>,
    finished: BTreeMap<ProgressId, ProgressItem>,
}

impl ProgressLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one message. On error the ledger is left untouched.
    pub fn apply(&mut self, message: &ProgressBarMessage) -> Result<(), LedgerError> {
        let id = message.id;
        match &message.event {
            ProgressBarEvent::Begin { kind, path } => self.begin(id, *kind, path.clone()),
            ProgressBarEvent::Advance { progress } => self.advance(id, *progress),
            ProgressBarEvent::SetTotal { total } => self.set_total(id, *total),
            ProgressBarEvent::Done => self.done(id),
        }
    }

    pub fn begin(
        &mut self,
        id: ProgressId,
        kind: ProgressBarKind,
        path: impl Into<String>,
    ) -> Result<(), LedgerError> {
        if self.running.contains_key(&id) || self.finished.contains_key(&id) {
            return Err(LedgerError::DuplicateId(id));
        }
        self.running.insert(
            id,
            ProgressItem {
                kind,
                path: path.into(),
                progress: 0,
                total: None,
            },
        );
        Ok(())
    }

    /// Records the latest progress value as-is; no monotonicity is enforced.
    pub fn advance(&mut self, id: ProgressId, progress: u64) -> Result<(), LedgerError> {
        self.running_mut(id)?.progress = progress;
        Ok(())
    }

    pub fn set_total(&mut self, id: ProgressId, total: u64) -> Result<(), LedgerError> {
        self.running_mut(id)?.total = Some(total);
        Ok(())
    }

    pub fn done(&mut self, id: ProgressId) -> Result<(), LedgerError> {
        let item = self
            .running
            .remove(&id)
            .ok_or(LedgerError::UnknownId(id))?;
        if item.kind == ProgressBarKind::Download {
            self.finished.insert(id, item);
        }
        Ok(())
    }

    pub fn running(&self) -> &BTreeMap<ProgressId, ProgressItem> {
        &self.running
    }

    pub fn finished(&self) -> &BTreeMap<ProgressId, ProgressItem> {
        &self.finished
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty() && self.finished.is_empty()
    }

    fn running_mut(&mut self, id: ProgressId) -> Result<&mut ProgressItem, LedgerError> {
        self.running.get_mut(&id).ok_or(LedgerError::UnknownId(id))
    }
}
