use std::process::Stdio;

use reiter_logging::{reiter_debug, reiter_warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, BufReader};
use tokio::process::{Child, Command};

use crate::{SattelSettings, SyncError};

/// The pipes of one launched sattel run.
pub struct SyncIo {
    pub reader: Box<dyn AsyncBufRead + Send + Unpin>,
    pub writer: Box<dyn AsyncWrite + Send + Unpin>,
    /// Process to reap once the conversation is over; `None` for in-memory transports.
    pub child: Option<Child>,
}

#[async_trait::async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, json_args: &str) -> Result<SyncIo, SyncError>;
}

/// Starts sattel as a child process talking line-delimited JSON over stdio.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    settings: SattelSettings,
}

impl ProcessLauncher {
    pub fn new(settings: SattelSettings) -> Self {
        Self { settings }
    }

    fn command(&self, json_args: &str) -> Command {
        let mut command = Command::new(&self.settings.program);
        command.args(&self.settings.program_args).arg(json_args);
        if let Some(config_file) = &self.settings.config_file {
            command.arg(config_file);
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait::async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(&self, json_args: &str) -> Result<SyncIo, SyncError> {
        let mut child = self.command(json_args).spawn().map_err(|err| {
            SyncError::Launch(format!("{}: {}", self.settings.program.display(), err))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SyncError::Launch("stdin not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SyncError::Launch("stdout not captured".into()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    reiter_warn!(target: "sattel", "{}", line);
                }
            });
        }

        Ok(SyncIo {
            reader: Box::new(BufReader::new(stdout)),
            writer: Box::new(stdin),
            child: Some(child),
        })
    }
}

/// Stops a child that may still be running and reaps it.
pub(crate) async fn reap(mut child: Child) {
    if let Err(err) = child.start_kill() {
        reiter_debug!("sattel already exited: {}", err);
    }
    match child.wait().await {
        Ok(status) => reiter_debug!("sattel exited with {}", status),
        Err(err) => reiter_warn!("failed to reap sattel: {}", err),
    }
}
