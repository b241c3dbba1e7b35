use std::sync::{mpsc, Arc};
use std::thread;

use reiter_logging::{reiter_debug, reiter_error, reiter_info, reiter_warn};

use crate::launcher::reap;
use crate::session::{drive_session, run_link, RunControl, RunLink};
use crate::{
    AdvanceThrottle, ChannelEventSink, EngineEvent, EventSink, Launcher, ProcessLauncher,
    RunGeneration, SattelSettings, SyncError, SyncSubject,
};

enum EngineCommand {
    StartSync {
        generation: RunGeneration,
        subject: SyncSubject,
    },
    Respond {
        value: String,
    },
    Cancel,
}

/// Owns the backend thread. Commands go in, generation-tagged events come out.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    // Lets the handle settle a run itself once the engine thread is gone.
    event_tx: mpsc::Sender<EngineEvent>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: SattelSettings) -> Self {
        let stride = settings.advance_stride;
        Self::with_launcher(Arc::new(ProcessLauncher::new(settings)), stride)
    }

    pub fn with_launcher(launcher: Arc<dyn Launcher>, advance_stride: u32) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx.clone()));

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut active: Option<RunLink> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::StartSync {
                        generation,
                        subject,
                    } => {
                        if let Some(previous) = active.take().filter(|run| !run.is_finished()) {
                            reiter_warn!("starting run {} while another is active", generation);
                            previous.cancel();
                        }
                        let (link, control) = run_link();
                        active = Some(link);
                        let launcher = launcher.clone();
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            let result = run_sync(
                                launcher.as_ref(),
                                &subject,
                                control,
                                AdvanceThrottle::new(advance_stride),
                                generation,
                                sink.as_ref(),
                            )
                            .await;
                            sink.emit(EngineEvent::SyncSettled { generation, result });
                        });
                    }
                    EngineCommand::Respond { value } => match &active {
                        Some(run) if run.respond(value) => {}
                        _ => reiter_warn!("dropping response: no sync run is waiting for one"),
                    },
                    EngineCommand::Cancel => match &active {
                        Some(run) => run.cancel(),
                        None => reiter_debug!("cancel requested with no sync run"),
                    },
                }
            }
            reiter_debug!("engine command channel closed");
        });

        Self {
            cmd_tx,
            event_tx,
            event_rx,
        }
    }

    /// Starts a sync job. Its events carry `generation`; it settles exactly once.
    ///
    /// If the engine thread is gone the run settles right away with a launch error.
    pub fn start_sync(&self, generation: RunGeneration, subject: SyncSubject) {
        let command = EngineCommand::StartSync {
            generation,
            subject,
        };
        if self.cmd_tx.send(command).is_err() {
            reiter_error!("engine thread stopped; sync run {} cannot start", generation);
            let _ = self.event_tx.send(EngineEvent::SyncSettled {
                generation,
                result: Err(SyncError::Launch("engine thread stopped".into())),
            });
        }
    }

    /// Answers the active run's pending request.
    pub fn respond(&self, value: impl Into<String>) {
        let command = EngineCommand::Respond {
            value: value.into(),
        };
        if self.cmd_tx.send(command).is_err() {
            reiter_error!("engine thread stopped; response dropped");
        }
    }

    /// Asks the active run to stop; it still settles through `SyncSettled`.
    pub fn cancel(&self) {
        if self.cmd_tx.send(EngineCommand::Cancel).is_err() {
            reiter_error!("engine thread stopped; cancel dropped");
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

async fn run_sync(
    launcher: &dyn Launcher,
    subject: &SyncSubject,
    control: RunControl,
    throttle: AdvanceThrottle,
    generation: RunGeneration,
    sink: &dyn EventSink,
) -> Result<(), SyncError> {
    let json_args = subject.to_json_args()?;
    reiter_info!("launching sattel for run {} with {}", generation, json_args);
    let io = launcher.launch(&json_args).await?;

    let result = drive_session(io.reader, io.writer, control, throttle, generation, sink).await;
    if let Some(child) = io.child {
        reap(child).await;
    }
    result
}
