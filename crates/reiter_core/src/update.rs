use reiter_logging::{reiter_debug, reiter_error, reiter_info, reiter_warn};

use crate::{AppState, Effect, Msg, RelayAction, RunGeneration};

/// Pure update function: applies a message to state and returns any effects.
///
/// After every message the queued run, if any, is started once the controller is idle.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let mut effects = match msg {
        Msg::SyncRequested { crawler } => {
            state.queue_run(crawler);
            Vec::new()
        }
        Msg::SyncManyRequested { crawlers } => {
            for crawler in crawlers {
                state.queue_run(Some(crawler));
            }
            Vec::new()
        }
        Msg::CancelClicked => vec![state.cancel_run()],
        Msg::SyncSettled {
            generation,
            outcome,
        } => {
            if state.settle_run(generation) {
                match outcome {
                    Ok(()) => reiter_info!("sync run {} finished", generation),
                    Err(err) => reiter_error!("sync run {} failed: {}", generation, err),
                }
            } else {
                reiter_warn!("ignoring settlement of inactive sync run {}", generation);
            }
            Vec::new()
        }
        Msg::CrawlStarted {
            generation,
            crawler,
        } => {
            if accepts(&state, generation, "crawl") {
                state.session_mut().set_current_crawler(crawler);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ProgressBar {
            generation,
            message,
        } => {
            if accepts(&state, generation, "progress bar") {
                match state.session_mut().ledger_mut().apply(&message) {
                    Ok(()) => state.mark_dirty(),
                    Err(err) => reiter_warn!("ignoring {:?}: {}", message.event, err),
                }
            }
            Vec::new()
        }
        Msg::CredentialRequested {
            generation,
            subject,
        } => {
            if accepts(&state, generation, "request") {
                match state.relay_mut().request(subject) {
                    Ok(action) => {
                        state.mark_dirty();
                        relay_effects(&mut state, action)
                    }
                    Err(err) => {
                        reiter_warn!("ignoring credential request: {}", err);
                        Vec::new()
                    }
                }
            } else {
                Vec::new()
            }
        }
        Msg::LoginFailed { generation } => {
            if accepts(&state, generation, "loginFailed") {
                state.relay_mut().mark_login_failed();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PromptInputChanged(text) => {
            if state.relay_mut().set_input(text) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PromptSubmitted => {
            if state.relay().prompt().is_some() {
                // A rejected submission still changes the visible error.
                state.mark_dirty();
            }
            let action = state.relay_mut().submit();
            relay_effects(&mut state, action)
        }
        Msg::PromptCancelled => {
            let action = state.relay_mut().cancel();
            relay_effects(&mut state, action)
        }
        Msg::LoginErrorDismissed => {
            if state.relay_mut().dismiss_error() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    effects.extend(state.start_queued_run());
    (state, effects)
}

fn relay_effects(state: &mut AppState, action: RelayAction) -> Vec<Effect> {
    match action {
        RelayAction::Nothing => Vec::new(),
        RelayAction::Respond(value) => vec![Effect::Respond { value }],
        RelayAction::CancelRun => {
            state.mark_dirty();
            vec![state.cancel_run()]
        }
    }
}

fn accepts(state: &AppState, generation: RunGeneration, what: &str) -> bool {
    let accepted = state.session().accepts(generation);
    if !accepted {
        reiter_debug!(
            "dropping stale {} event from run {} (current {})",
            what,
            generation,
            state.session().generation()
        );
    }
    accepted
}
