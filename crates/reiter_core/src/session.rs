use crate::{ProgressLedger, RunGeneration};

/// Per-run state: replaced wholesale whenever a run starts or settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSession {
    generation: RunGeneration,
    ledger: ProgressLedger,
    current_crawler: Option<String>,
}

impl RunSession {
    pub fn new(generation: RunGeneration) -> Self {
        Self {
            generation,
            ledger: ProgressLedger::new(),
            current_crawler: None,
        }
    }

    pub fn generation(&self) -> RunGeneration {
        self.generation
    }

    /// Whether an event tagged with `generation` belongs to this session.
    pub fn accepts(&self, generation: RunGeneration) -> bool {
        self.generation == generation
    }

    pub fn ledger(&self) -> &ProgressLedger {
        &self.ledger
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut ProgressLedger {
        &mut self.ledger
    }

    pub fn current_crawler(&self) -> Option<&str> {
        self.current_crawler.as_deref()
    }

    pub(crate) fn set_current_crawler(&mut self, crawler: String) {
        self.current_crawler = Some(crawler);
    }
}

impl Default for RunSession {
    fn default() -> Self {
        Self::new(0)
    }
}
