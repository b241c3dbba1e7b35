use reiter_logging::{reiter_debug, reiter_info, reiter_warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::types::SattelMessage;
use crate::{AdvanceThrottle, EngineEvent, EventSink, RunGeneration, SyncError};

/// UI side of one run: answers requests and asks the run to stop.
#[derive(Debug, Clone)]
pub struct RunLink {
    responses: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl RunLink {
    /// Queues one response line. Returns false once the run is over.
    pub fn respond(&self, value: impl Into<String>) -> bool {
        self.responses.send(value.into()).is_ok()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.responses.is_closed()
    }
}

/// Session side of one run.
#[derive(Debug)]
pub struct RunControl {
    responses: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
}

pub fn run_link() -> (RunLink, RunControl) {
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    (
        RunLink {
            responses: tx,
            cancel: cancel.clone(),
        },
        RunControl {
            responses: rx,
            cancel,
        },
    )
}

enum Flow {
    Continue,
    Finished,
}

/// Pumps one sattel conversation until `done`, end of output, an error, or cancellation.
///
/// Every forwarded event is tagged with `generation`. Responses are written as one
/// line each, in the order they were queued.
pub async fn drive_session<R, W>(
    reader: R,
    mut writer: W,
    mut control: RunControl,
    mut throttle: AdvanceThrottle,
    generation: RunGeneration,
    sink: &dyn EventSink,
) -> Result<(), SyncError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    loop {
        tokio::select! {
            biased;
            _ = control.cancel.cancelled() => {
                reiter_info!("sync run {} cancelled", generation);
                return Ok(());
            }
            Some(response) = control.responses.recv() => {
                if let Err(err) = write_response(&mut writer, &response).await {
                    reiter_warn!("could not answer sattel in run {}: {}", generation, err);
                }
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Flow::Finished = handle_line(&line, &mut throttle, generation, sink)? {
                        return Ok(());
                    }
                }
                Ok(None) => {
                    reiter_debug!("sattel closed its output in run {}", generation);
                    return Ok(());
                }
                Err(err) => return Err(SyncError::Io(err.to_string())),
            },
        }
    }
}

async fn write_response<W>(writer: &mut W, response: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let line = response.trim_end_matches(['\r', '\n']);
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

fn handle_line(
    line: &str,
    throttle: &mut AdvanceThrottle,
    generation: RunGeneration,
    sink: &dyn EventSink,
) -> Result<Flow, SyncError> {
    if line.trim().is_empty() {
        return Ok(Flow::Continue);
    }
    let message: SattelMessage = match serde_json::from_str(line) {
        Ok(message) => message,
        Err(err) => {
            reiter_warn!("skipping undecodable sattel line {:?}: {}", line, err);
            return Ok(Flow::Continue);
        }
    };

    match message {
        SattelMessage::Error(failure) => return Err(failure.into()),
        SattelMessage::LoginFailed => sink.emit(EngineEvent::LoginFailed { generation }),
        SattelMessage::Crawl { name } => sink.emit(EngineEvent::Crawl { generation, name }),
        SattelMessage::ProgressBar(message) => {
            for message in throttle.filter(message) {
                sink.emit(EngineEvent::ProgressBar {
                    generation,
                    message,
                });
            }
        }
        SattelMessage::Request { subject } => {
            sink.emit(EngineEvent::Request {
                generation,
                subject,
            });
        }
        SattelMessage::Log { info } => reiter_info!(target: "sattel", "{}", info),
        SattelMessage::Done => {
            reiter_info!("sattel finished run {}", generation);
            return Ok(Flow::Finished);
        }
    }
    Ok(Flow::Continue)
}
