use std::sync::Mutex;

use pretty_assertions::assert_eq;
use reiter_engine::{
    drive_session, run_link, AdvanceThrottle, BarEvent, BarKind, BarMessage, EngineEvent,
    EventSink, RequestSubject, RunLink, SyncError,
};
use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

/// Records events and plays the UI: answers requests and optionally cancels on `crawl`.
struct ScriptedSink {
    events: Mutex<Vec<EngineEvent>>,
    link: RunLink,
    answer: Option<String>,
    cancel_on_crawl: bool,
}

impl ScriptedSink {
    fn new(link: RunLink) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            link,
            answer: None,
            cancel_on_crawl: false,
        }
    }

    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for ScriptedSink {
    fn emit(&self, event: EngineEvent) {
        match &event {
            EngineEvent::Request { .. } => {
                if let Some(answer) = &self.answer {
                    self.link.respond(answer.clone());
                }
            }
            EngineEvent::Crawl { .. } if self.cancel_on_crawl => self.link.cancel(),
            _ => {}
        }
        self.events.lock().unwrap().push(event);
    }
}

struct Pipes {
    /// What sattel writes.
    backend_out: DuplexStream,
    /// What sattel reads.
    backend_in: BufReader<DuplexStream>,
    ui_in: BufReader<DuplexStream>,
    ui_out: DuplexStream,
}

fn pipes() -> Pipes {
    let (backend_out, ui_in) = duplex(4096);
    let (ui_out, backend_in) = duplex(4096);
    Pipes {
        backend_out,
        backend_in: BufReader::new(backend_in),
        ui_in: BufReader::new(ui_in),
        ui_out,
    }
}

async fn send(out: &mut DuplexStream, line: &str) {
    out.write_all(line.as_bytes()).await.unwrap();
    out.write_all(b"\n").await.unwrap();
}

#[tokio::test]
async fn request_is_answered_over_stdin() {
    let Pipes {
        mut backend_out,
        backend_in,
        ui_in,
        ui_out,
    } = pipes();
    let (link, control) = run_link();
    let mut sink = ScriptedSink::new(link);
    sink.answer = Some("alice".to_string());

    let backend = tokio::spawn(async move {
        let mut input = backend_in.lines();
        send(&mut backend_out, r#"{"kind":"request","subject":"username"}"#).await;
        let answer = input.next_line().await.unwrap().unwrap();
        send(&mut backend_out, &format!(r#"{{"kind":"crawl","name":"{answer}"}}"#)).await;
        send(&mut backend_out, r#"{"kind":"done"}"#).await;
        answer
    });

    let result = drive_session(ui_in, ui_out, control, AdvanceThrottle::new(1), 7, &sink).await;

    assert_eq!(result, Ok(()));
    assert_eq!(backend.await.unwrap(), "alice");
    assert_eq!(
        sink.take(),
        vec![
            EngineEvent::Request {
                generation: 7,
                subject: RequestSubject::Username,
            },
            EngineEvent::Crawl {
                generation: 7,
                name: "alice".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn backend_error_ends_the_run() {
    let Pipes {
        mut backend_out,
        ui_in,
        ui_out,
        ..
    } = pipes();
    let (link, control) = run_link();
    let sink = ScriptedSink::new(link);

    send(&mut backend_out, "this is not json").await;
    send(
        &mut backend_out,
        r#"{"kind":"error","exception":"ConfigError","message":"missing target"}"#,
    )
    .await;

    let result = drive_session(ui_in, ui_out, control, AdvanceThrottle::new(1), 1, &sink).await;

    assert_eq!(
        result,
        Err(SyncError::Backend {
            exception: "ConfigError".to_string(),
            message: "missing target".to_string(),
        })
    );
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn cancel_stops_reading_while_backend_is_still_open() {
    let Pipes {
        mut backend_out,
        ui_in,
        ui_out,
        ..
    } = pipes();
    let (link, control) = run_link();
    let mut sink = ScriptedSink::new(link.clone());
    sink.cancel_on_crawl = true;

    send(&mut backend_out, r#"{"kind":"crawl","name":"CourseA"}"#).await;

    let result = drive_session(ui_in, ui_out, control, AdvanceThrottle::new(1), 2, &sink).await;

    assert_eq!(result, Ok(()));
    assert_eq!(sink.take().len(), 1);
    assert!(link.is_finished());
    drop(backend_out);
}

#[tokio::test]
async fn end_of_output_settles_normally() {
    let Pipes {
        mut backend_out,
        ui_in,
        ui_out,
        ..
    } = pipes();
    let (link, control) = run_link();
    let sink = ScriptedSink::new(link);

    send(&mut backend_out, r#"{"kind":"loginFailed"}"#).await;
    send(&mut backend_out, r#"{"kind":"log","info":"crawling week 1"}"#).await;
    drop(backend_out);

    let result = drive_session(ui_in, ui_out, control, AdvanceThrottle::new(1), 3, &sink).await;

    assert_eq!(result, Ok(()));
    assert_eq!(sink.take(), vec![EngineEvent::LoginFailed { generation: 3 }]);
}

#[tokio::test]
async fn advance_traffic_is_thinned_but_final_progress_survives() {
    let Pipes {
        mut backend_out,
        ui_in,
        ui_out,
        ..
    } = pipes();
    let (link, control) = run_link();
    let sink = ScriptedSink::new(link);

    send(
        &mut backend_out,
        r#"{"kind":"progressBar","id":1,"event":{"kind":"begin","bar":"download","path":"file.pdf"}}"#,
    )
    .await;
    for progress in [100, 200, 300] {
        send(
            &mut backend_out,
            &format!(
                r#"{{"kind":"progressBar","id":1,"event":{{"kind":"advance","progress":{progress}}}}}"#
            ),
        )
        .await;
    }
    send(
        &mut backend_out,
        r#"{"kind":"progressBar","id":1,"event":{"kind":"done"}}"#,
    )
    .await;
    send(&mut backend_out, r#"{"kind":"done"}"#).await;

    let result =
        drive_session(ui_in, ui_out, control, AdvanceThrottle::new(100), 4, &sink).await;
    assert_eq!(result, Ok(()));

    let messages: Vec<BarMessage> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::ProgressBar { message, .. } => Some(message),
            _ => None,
        })
        .collect();
    let bar = |event| BarMessage { id: 1, event };
    assert_eq!(
        messages,
        vec![
            bar(BarEvent::Begin {
                bar: BarKind::Download,
                path: "file.pdf".to_string(),
            }),
            bar(BarEvent::Advance { progress: 100 }),
            bar(BarEvent::Advance { progress: 300 }),
            bar(BarEvent::Done),
        ]
    );
}
