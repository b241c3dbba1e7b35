use reiter_logging::{reiter_debug, reiter_info};

use crate::view_model::AppViewModel;
use crate::{CredentialRelay, Effect, RunController, RunGeneration, RunSession};

/// Everything the shell renders: run control, the current run session and the prompt relay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    controller: RunController,
    session: RunSession,
    relay: CredentialRelay,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self)
    }

    /// Returns whether anything visible changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn controller(&self) -> &RunController {
        &self.controller
    }

    pub fn session(&self) -> &RunSession {
        &self.session
    }

    pub fn relay(&self) -> &CredentialRelay {
        &self.relay
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn session_mut(&mut self) -> &mut RunSession {
        &mut self.session
    }

    pub(crate) fn relay_mut(&mut self) -> &mut CredentialRelay {
        &mut self.relay
    }

    pub(crate) fn queue_run(&mut self, crawler: Option<String>) {
        if self.controller.queue(crawler) {
            self.mark_dirty();
        } else {
            reiter_debug!("sync request absorbed by an all-crawlers run");
        }
    }

    pub(crate) fn cancel_run(&mut self) -> Effect {
        if self.controller.clear_queue() {
            self.mark_dirty();
        }
        Effect::Cancel
    }

    /// Starts the queued run when idle. Both the session and the relay are fresh afterwards.
    pub(crate) fn start_queued_run(&mut self) -> Option<Effect> {
        let (generation, request) = self.controller.take_start()?;
        reiter_info!("starting sync run {} for {:?}", generation, request);
        self.replace_session(generation);
        Some(Effect::StartSync {
            generation,
            request,
        })
    }

    pub(crate) fn settle_run(&mut self, generation: RunGeneration) -> bool {
        if !self.controller.settle(generation) {
            return false;
        }
        let idle = self.controller.next_generation();
        self.replace_session(idle);
        true
    }

    fn replace_session(&mut self, generation: RunGeneration) {
        self.session = RunSession::new(generation);
        self.relay = CredentialRelay::new();
        self.mark_dirty();
    }
}
