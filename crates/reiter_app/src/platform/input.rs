use std::io::{self, BufRead, IsTerminal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use reiter_logging::{reiter_debug, reiter_warn};

const POLL: Duration = Duration::from_millis(100);

pub enum Input {
    Tick,
    Line(String),
    StdinClosed,
}

/// Reads stdin lines on a background thread.
///
/// On a terminal, echo is turned off while `masked` is set so passwords are not shown.
pub fn spawn_stdin_reader(tx: mpsc::Sender<Input>, masked: Arc<AtomicBool>) {
    thread::spawn(move || {
        if io::stdin().is_terminal() {
            read_terminal(&tx, &masked);
        } else {
            read_lines(&tx);
        }
        let _ = tx.send(Input::StdinClosed);
    });
}

/// Puts the terminal back into line mode; harmless when it never left it.
pub fn restore_terminal() {
    if let Err(err) = terminal::disable_raw_mode() {
        reiter_debug!("could not restore terminal mode: {}", err);
    }
}

fn read_lines(tx: &mpsc::Sender<Input>) {
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        if tx.send(Input::Line(line)).is_err() {
            return;
        }
    }
}

fn read_terminal(tx: &mpsc::Sender<Input>, masked: &AtomicBool) {
    let mut editor = LineEditor::default();
    let mut raw = false;
    loop {
        let want_raw = masked.load(Ordering::SeqCst);
        if want_raw != raw {
            let switched = if want_raw {
                terminal::enable_raw_mode()
            } else {
                terminal::disable_raw_mode()
            };
            if let Err(err) = switched {
                reiter_warn!("could not switch terminal echo: {}", err);
            }
            raw = want_raw;
        }

        match event::poll(POLL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                reiter_warn!("stdin poll failed: {}", err);
                break;
            }
        }
        let key = match event::read() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(err) => {
                reiter_warn!("stdin read failed: {}", err);
                break;
            }
        };

        let input = match editor.key(key) {
            KeyOutcome::Pending => continue,
            KeyOutcome::Line(line) => Input::Line(line),
            KeyOutcome::Interrupt => Input::Line(":cancel".to_string()),
            KeyOutcome::EndOfInput => break,
        };
        if tx.send(input).is_err() {
            break;
        }
    }
    if raw {
        restore_terminal();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Pending,
    Line(String),
    /// Ctrl-C while echo is off, where no signal is raised.
    Interrupt,
    EndOfInput,
}

/// Collects key presses into lines.
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: String,
}

impl LineEditor {
    pub fn key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind == KeyEventKind::Release {
            return KeyOutcome::Pending;
        }
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => KeyOutcome::Line(std::mem::take(&mut self.buffer)),
            KeyCode::Backspace => {
                self.buffer.pop();
                KeyOutcome::Pending
            }
            KeyCode::Char('c') if control => {
                self.buffer.clear();
                KeyOutcome::Interrupt
            }
            KeyCode::Char('d') if control && self.buffer.is_empty() => KeyOutcome::EndOfInput,
            KeyCode::Char(c) if !control => {
                self.buffer.push(c);
                KeyOutcome::Pending
            }
            _ => KeyOutcome::Pending,
        }
    }
}
