/// Tag distinguishing one run (and its event stream) from every other.
pub type RunGeneration = u64;

/// Subject of a sync job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunRequest {
    AllCrawlers,
    Crawlers(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueuedRun {
    #[default]
    Nothing,
    All,
    Crawlers(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveRun {
    generation: RunGeneration,
    request: RunRequest,
}

/// Decides when a sync job starts; at most one is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunController {
    active: Option<ActiveRun>,
    queued: QueuedRun,
    last_generation: RunGeneration,
}

impl RunController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn queued(&self) -> &QueuedRun {
        &self.queued
    }

    pub fn active_request(&self) -> Option<&RunRequest> {
        self.active.as_ref().map(|run| &run.request)
    }

    pub fn active_generation(&self) -> Option<RunGeneration> {
        self.active.as_ref().map(|run| run.generation)
    }

    /// Queues a crawler, or all crawlers for `None`. Returns whether anything changed.
    ///
    /// A queued or active all-crawlers run absorbs every further request.
    pub fn queue(&mut self, crawler: Option<String>) -> bool {
        let all_active = matches!(self.active_request(), Some(RunRequest::AllCrawlers));
        if all_active || self.queued == QueuedRun::All {
            return false;
        }
        match crawler {
            None => self.queued = QueuedRun::All,
            Some(name) => match &mut self.queued {
                QueuedRun::Crawlers(names) => names.push(name),
                queued => *queued = QueuedRun::Crawlers(vec![name]),
            },
        }
        true
    }

    /// Drops everything queued. The active run is left to the backend.
    pub fn clear_queue(&mut self) -> bool {
        std::mem::take(&mut self.queued) != QueuedRun::Nothing
    }

    /// Starts the queued run if idle, returning its generation and subject.
    pub fn take_start(&mut self) -> Option<(RunGeneration, RunRequest)> {
        if self.is_running() {
            return None;
        }
        let request = match std::mem::take(&mut self.queued) {
            QueuedRun::Nothing => return None,
            QueuedRun::All => RunRequest::AllCrawlers,
            QueuedRun::Crawlers(names) => RunRequest::Crawlers(names),
        };
        let generation = self.next_generation();
        self.active = Some(ActiveRun {
            generation,
            request: request.clone(),
        });
        Some((generation, request))
    }

    /// Marks the run with `generation` as settled. Stale generations are refused.
    pub fn settle(&mut self, generation: RunGeneration) -> bool {
        if self.active_generation() != Some(generation) {
            return false;
        }
        self.active = None;
        true
    }

    /// Issues a generation no backend run will ever carry, for idle sessions.
    pub fn next_generation(&mut self) -> RunGeneration {
        self.last_generation += 1;
        self.last_generation
    }
}
