use reiter_core::{
    CredentialSubject, Effect, Msg, ProgressBarEvent, ProgressBarKind, ProgressBarMessage,
    RunRequest,
};
use reiter_engine::{
    BarEvent, BarKind, BarMessage, EngineEvent, EngineHandle, RequestSubject, SattelSettings,
    SyncSubject,
};
use reiter_logging::{reiter_debug, reiter_info, reiter_warn};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: SattelSettings) -> Self {
        Self {
            engine: EngineHandle::new(settings),
        }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartSync {
                    generation,
                    request,
                } => {
                    let subject = match request {
                        RunRequest::AllCrawlers => SyncSubject::All,
                        RunRequest::Crawlers(names) => SyncSubject::Crawlers(names),
                    };
                    reiter_info!("StartSync generation={} subject={:?}", generation, subject);
                    self.engine.start_sync(generation, subject);
                }
                Effect::Respond { value } => {
                    // Responses may be passwords.
                    reiter_debug!("Respond value_len={}", value.len());
                    self.engine.respond(value);
                }
                Effect::Cancel => {
                    reiter_info!("Cancel");
                    self.engine.cancel();
                }
            }
        }
    }

    /// Collects every engine event that arrived since the last call.
    pub fn drain_events(&self) -> Vec<Msg> {
        std::iter::from_fn(|| self.engine.try_recv())
            .map(map_event)
            .collect()
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Crawl { generation, name } => Msg::CrawlStarted {
            generation,
            crawler: name,
        },
        EngineEvent::Request {
            generation,
            subject,
        } => Msg::CredentialRequested {
            generation,
            subject: map_subject(subject),
        },
        EngineEvent::LoginFailed { generation } => Msg::LoginFailed { generation },
        EngineEvent::ProgressBar {
            generation,
            message,
        } => Msg::ProgressBar {
            generation,
            message: map_bar(message),
        },
        EngineEvent::SyncSettled { generation, result } => Msg::SyncSettled {
            generation,
            outcome: result.map_err(|err| {
                reiter_warn!("Sync run {} failed: {}", generation, err);
                err.to_string()
            }),
        },
    }
}

fn map_bar(message: BarMessage) -> ProgressBarMessage {
    let event = match message.event {
        BarEvent::Begin { bar, path } => ProgressBarEvent::Begin {
            kind: map_kind(bar),
            path,
        },
        BarEvent::Advance { progress } => ProgressBarEvent::Advance { progress },
        BarEvent::SetTotal { total } => ProgressBarEvent::SetTotal { total },
        BarEvent::Done => ProgressBarEvent::Done,
    };
    ProgressBarMessage::new(message.id, event)
}

fn map_kind(kind: BarKind) -> ProgressBarKind {
    match kind {
        BarKind::Download => ProgressBarKind::Download,
        BarKind::Crawl => ProgressBarKind::Crawl,
    }
}

fn map_subject(subject: RequestSubject) -> CredentialSubject {
    match subject {
        RequestSubject::Username => CredentialSubject::Username,
        RequestSubject::Password => CredentialSubject::Password,
        RequestSubject::JsonArgs => CredentialSubject::BulkArguments,
    }
}
