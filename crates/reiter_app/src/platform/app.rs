use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use reiter_core::{update, AppState, Effect, Msg, PromptKind, QueuedRun, RunGeneration};
use reiter_logging::{reiter_debug, reiter_error, reiter_info};

use super::cli::Cli;
use super::console::{parse_line, ConsoleCommand, HELP};
use super::effects::EffectRunner;
use super::input::{restore_terminal, spawn_stdin_reader, Input};
use super::settings::{load_settings, save_settings, AppSettings};
use super::ui::board::Board;

const TICK: Duration = Duration::from_millis(75);

pub fn run_app() -> ExitCode {
    let cli = Cli::parse();
    reiter_logging::initialize(cli.log_to.into(), reiter_logging::parse_level(&cli.log_level));

    let mut settings = load_settings(&cli.settings);
    if let Some(program) = &cli.sattel {
        settings.sattel_program = program.clone();
    }
    if let Some(config) = &cli.config {
        settings.config_file = Some(config.clone());
    }
    reiter_info!("Starting reiter with sattel {:?}", settings.sattel_program);

    let masked = Arc::new(AtomicBool::new(false));
    let (input_tx, input_rx) = mpsc::channel::<Input>();
    spawn_ticker(input_tx.clone());
    spawn_stdin_reader(input_tx, masked.clone());

    let initial = if cli.crawlers.is_empty() {
        Msg::SyncRequested { crawler: None }
    } else {
        Msg::SyncManyRequested {
            crawlers: cli.crawlers.clone(),
        }
    };

    let effects = EffectRunner::new(settings.sattel_settings());
    let mut shell = Shell::new(effects, cli, settings, Board::new(), masked);
    shell.dispatch(initial);

    loop {
        let input = match input_rx.recv_timeout(TICK) {
            Ok(input) => Some(input),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };

        shell.pump_engine();

        match input {
            Some(Input::Tick) => shell.dispatch(Msg::Tick),
            Some(Input::Line(line)) => {
                if !shell.handle_line(&line) {
                    shell.quit();
                }
            }
            Some(Input::StdinClosed) => shell.stdin_closed(),
            None => {}
        }

        if shell.should_exit() {
            break;
        }
    }

    shell.draw();
    shell.board.finish();
    restore_terminal();
    if shell.last_run_failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn spawn_ticker(tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        while tx.send(Input::Tick).is_ok() {
            thread::sleep(TICK);
        }
    });
}

struct Shell {
    state: AppState,
    effects: EffectRunner,
    cli: Cli,
    settings: AppSettings,
    board: Board,
    /// Set while a password prompt is open; the stdin reader hides echo.
    masked: Arc<AtomicBool>,
    /// Run the user asked to stop. It settles `Ok` but is not a successful sync.
    cancelled: Option<RunGeneration>,
    needs_render: bool,
    notice: Option<String>,
    stdin_open: bool,
    quitting: bool,
    last_run_failed: bool,
}

impl Shell {
    fn new(
        effects: EffectRunner,
        cli: Cli,
        settings: AppSettings,
        board: Board,
        masked: Arc<AtomicBool>,
    ) -> Self {
        Self {
            state: AppState::new(),
            effects,
            cli,
            settings,
            board,
            masked,
            cancelled: None,
            needs_render: true,
            notice: None,
            stdin_open: true,
            quitting: false,
            last_run_failed: false,
        }
    }

    fn pump_engine(&mut self) {
        for msg in self.effects.drain_events() {
            self.dispatch(msg);
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let is_tick = matches!(msg, Msg::Tick);
        if let Msg::SyncSettled { generation, outcome } = &msg {
            if self.state.controller().active_generation() == Some(*generation) {
                self.record_settled(*generation, outcome.is_ok());
            }
        }

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.needs_render = true;
        }
        self.state = state;

        if effects.contains(&Effect::Cancel) {
            if let Some(generation) = self.state.controller().active_generation() {
                self.cancelled = Some(generation);
            }
        }
        let password_open = self
            .state
            .relay()
            .prompt()
            .is_some_and(|prompt| prompt.kind == PromptKind::Password);
        self.masked.store(password_open, Ordering::SeqCst);
        self.effects.run(effects);

        self.close_unanswerable_prompt();
        if is_tick && self.needs_render {
            self.draw();
        }
    }

    fn record_settled(&mut self, generation: RunGeneration, ok: bool) {
        let cancelled = self.cancelled.take() == Some(generation);
        if cancelled {
            reiter_info!("sync run {} was cancelled", generation);
        }
        let synced = ok && !cancelled;
        self.last_run_failed = !synced;
        if !synced {
            return;
        }
        self.settings.last_sync_utc = Some(Utc::now().to_rfc3339());
        if let Err(err) = save_settings(&self.cli.settings, &self.settings) {
            reiter_error!("Failed to save settings to {:?}: {}", self.cli.settings, err);
        }
    }

    /// Returns false when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        let prompt_open = self.state.relay().prompt().is_some();
        match parse_line(line, prompt_open) {
            ConsoleCommand::Msgs(msgs) => {
                self.notice = None;
                for msg in msgs {
                    self.dispatch(msg);
                }
            }
            ConsoleCommand::Quit => return false,
            ConsoleCommand::Help => self.set_notice(HELP.to_string()),
            ConsoleCommand::Unknown(text) => {
                self.set_notice(format!("unknown command {text:?}; :help lists commands"))
            }
        }
        true
    }

    fn set_notice(&mut self, notice: String) {
        self.notice = Some(notice);
        self.needs_render = true;
    }

    fn stdin_closed(&mut self) {
        reiter_debug!("stdin closed");
        self.stdin_open = false;
        self.close_unanswerable_prompt();
    }

    // Without stdin nobody can answer, and sattel would wait forever.
    fn close_unanswerable_prompt(&mut self) {
        if !self.stdin_open && self.state.relay().prompt().is_some() {
            reiter_info!("no input left to answer the prompt; cancelling the run");
            self.dispatch(Msg::PromptCancelled);
        }
    }

    fn quit(&mut self) {
        self.quitting = true;
        if self.state.relay().prompt().is_some() {
            self.dispatch(Msg::PromptCancelled);
        }
        if self.state.is_running() {
            self.dispatch(Msg::CancelClicked);
        }
    }

    fn should_exit(&self) -> bool {
        let settled = !self.state.is_running()
            && matches!(self.state.controller().queued(), QueuedRun::Nothing);
        if !settled {
            return false;
        }
        self.quitting || !self.cli.interactive || !self.stdin_open
    }

    fn draw(&mut self) {
        self.needs_render = false;
        let view = self.state.view();
        self.board.draw(&view, self.notice.as_deref());
    }
}
