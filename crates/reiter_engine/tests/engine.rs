use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use reiter_engine::{
    BarEvent, BarKind, BarMessage, EngineEvent, EngineHandle, Launcher, RequestSubject,
    SattelSettings, SyncError, SyncIo, SyncSubject,
};
use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

/// In-memory sattel: asks for job arguments, crawls, downloads one file.
#[derive(Default)]
struct FakeSattel {
    args: Arc<Mutex<Vec<String>>>,
    answers: Arc<Mutex<Vec<String>>>,
    hang_after_crawl: bool,
}

async fn send(out: &mut DuplexStream, line: &str) {
    let _ = out.write_all(format!("{line}\n").as_bytes()).await;
}

#[async_trait::async_trait]
impl Launcher for FakeSattel {
    async fn launch(&self, json_args: &str) -> Result<SyncIo, SyncError> {
        self.args.lock().unwrap().push(json_args.to_string());
        let (mut backend_out, ui_in) = duplex(4096);
        let (ui_out, backend_in) = duplex(4096);
        let answers = self.answers.clone();
        let hang = self.hang_after_crawl;

        tokio::spawn(async move {
            let mut input = BufReader::new(backend_in).lines();
            send(&mut backend_out, r#"{"kind":"request","subject":"jsonArgs"}"#).await;
            if let Ok(Some(answer)) = input.next_line().await {
                answers.lock().unwrap().push(answer);
            }
            send(&mut backend_out, r#"{"kind":"crawl","name":"CourseA"}"#).await;
            if hang {
                // Runs until the UI side closes our stdin.
                while let Ok(Some(_)) = input.next_line().await {}
                return;
            }
            for line in [
                r#"{"kind":"progressBar","id":1,"event":{"kind":"begin","bar":"download","path":"file.pdf"}}"#,
                r#"{"kind":"progressBar","id":1,"event":{"kind":"advance","progress":500}}"#,
                r#"{"kind":"progressBar","id":1,"event":{"kind":"setTotal","total":2000}}"#,
                r#"{"kind":"progressBar","id":1,"event":{"kind":"done"}}"#,
                r#"{"kind":"done"}"#,
            ] {
                send(&mut backend_out, line).await;
            }
        });

        Ok(SyncIo {
            reader: Box::new(BufReader::new(ui_in)),
            writer: Box::new(ui_out),
            child: None,
        })
    }
}

/// Polls the engine until the run settles, letting `react` answer events.
fn collect_until_settled(
    engine: &EngineHandle,
    mut react: impl FnMut(&EngineHandle, &EngineEvent),
) -> Vec<EngineEvent> {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut events = Vec::new();
    while Instant::now() < deadline {
        match engine.try_recv() {
            Some(event) => {
                react(engine, &event);
                let settled = matches!(event, EngineEvent::SyncSettled { .. });
                events.push(event);
                if settled {
                    return events;
                }
            }
            None => thread::sleep(Duration::from_millis(5)),
        }
    }
    panic!("run did not settle, saw {events:?}");
}

fn answer_json_args(engine: &EngineHandle, event: &EngineEvent) {
    if let EngineEvent::Request {
        subject: RequestSubject::JsonArgs,
        ..
    } = event
    {
        engine.respond("{}");
    }
}

#[test]
fn full_run_is_tagged_and_settles_once() {
    let fake = FakeSattel::default();
    let args = fake.args.clone();
    let answers = fake.answers.clone();
    let engine = EngineHandle::with_launcher(Arc::new(fake), 1);

    engine.start_sync(5, SyncSubject::Crawlers(vec!["CourseA".to_string()]));
    let events = collect_until_settled(&engine, answer_json_args);

    let bar = |event| EngineEvent::ProgressBar {
        generation: 5,
        message: BarMessage { id: 1, event },
    };
    assert_eq!(
        events,
        vec![
            EngineEvent::Request {
                generation: 5,
                subject: RequestSubject::JsonArgs,
            },
            EngineEvent::Crawl {
                generation: 5,
                name: "CourseA".to_string(),
            },
            bar(BarEvent::Begin {
                bar: BarKind::Download,
                path: "file.pdf".to_string(),
            }),
            bar(BarEvent::Advance { progress: 500 }),
            bar(BarEvent::SetTotal { total: 2000 }),
            bar(BarEvent::Done),
            EngineEvent::SyncSettled {
                generation: 5,
                result: Ok(()),
            },
        ]
    );
    assert_eq!(*args.lock().unwrap(), vec![r#"{"crawlers":["CourseA"]}"#]);
    assert_eq!(*answers.lock().unwrap(), vec!["{}"]);
}

#[test]
fn cancel_settles_a_hanging_run() {
    let fake = FakeSattel {
        hang_after_crawl: true,
        ..FakeSattel::default()
    };
    let engine = EngineHandle::with_launcher(Arc::new(fake), 1);

    engine.start_sync(1, SyncSubject::All);
    let events = collect_until_settled(&engine, |engine, event| {
        answer_json_args(engine, event);
        if let EngineEvent::Crawl { .. } = event {
            engine.cancel();
        }
    });

    assert_eq!(
        events.last(),
        Some(&EngineEvent::SyncSettled {
            generation: 1,
            result: Ok(()),
        })
    );
}

#[test]
fn missing_program_settles_with_launch_error() {
    let engine = EngineHandle::new(SattelSettings {
        program: "/definitely/not/a/sattel".into(),
        ..SattelSettings::default()
    });

    engine.start_sync(3, SyncSubject::All);
    let events = collect_until_settled(&engine, |_, _| {});

    assert!(matches!(
        events.as_slice(),
        [EngineEvent::SyncSettled {
            generation: 3,
            result: Err(SyncError::Launch(_)),
        }]
    ));
}

#[test]
fn responses_without_a_run_are_dropped() {
    let engine = EngineHandle::with_launcher(Arc::new(FakeSattel::default()), 1);
    engine.respond("orphan");
    engine.cancel();

    engine.start_sync(2, SyncSubject::All);
    let events = collect_until_settled(&engine, answer_json_args);
    assert!(matches!(
        events.last(),
        Some(EngineEvent::SyncSettled {
            generation: 2,
            result: Ok(()),
        })
    ));
}

#[cfg(unix)]
#[test]
fn talks_to_a_real_child_process() {
    const SCRIPT: &str = r#"
printf '%s\n' '{"kind":"request","subject":"username"}'
read answer
printf '{"kind":"crawl","name":"%s"}\n' "$answer"
printf '%s\n' '{"kind":"done"}'
"#;
    let engine = EngineHandle::new(SattelSettings {
        program: "sh".into(),
        program_args: vec!["-c".into(), SCRIPT.into(), "sattel".into()],
        config_file: None,
        advance_stride: 1,
    });

    engine.start_sync(9, SyncSubject::All);
    let events = collect_until_settled(&engine, |engine, event| {
        if let EngineEvent::Request { .. } = event {
            engine.respond("bob");
        }
    });

    assert_eq!(
        events,
        vec![
            EngineEvent::Request {
                generation: 9,
                subject: RequestSubject::Username,
            },
            EngineEvent::Crawl {
                generation: 9,
                name: "bob".to_string(),
            },
            EngineEvent::SyncSettled {
                generation: 9,
                result: Ok(()),
            },
        ]
    );
}
