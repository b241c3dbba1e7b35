use serde::{Deserialize, Serialize};

use crate::SyncError;

/// Tag of the run an event belongs to, chosen by the caller of `start_sync`.
pub type RunGeneration = u64;

pub type BarId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BarKind {
    Download,
    Crawl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
#[serde(rename_all = "camelCase")]
pub enum BarEvent {
    Begin { bar: BarKind, path: String },
    Advance { progress: u64 },
    SetTotal { total: u64 },
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarMessage {
    pub id: BarId,
    pub event: BarEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestSubject {
    Username,
    Password,
    /// Bulk job arguments.
    JsonArgs,
}

/// One line of sattel's stdout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind")]
#[serde(rename_all = "camelCase")]
pub(crate) enum SattelMessage {
    Error(BackendFailure),
    LoginFailed,
    Crawl { name: String },
    ProgressBar(BarMessage),
    Request { subject: RequestSubject },
    Log { info: String },
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct BackendFailure {
    pub exception: String,
    pub message: String,
}

impl From<BackendFailure> for SyncError {
    fn from(failure: BackendFailure) -> Self {
        SyncError::Backend {
            exception: failure.exception,
            message: failure.message,
        }
    }
}

/// Which crawlers a sync job covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncSubject {
    All,
    Crawlers(Vec<String>),
}

#[derive(Serialize)]
struct CrawlerArgs<'a> {
    crawlers: &'a [String],
}

impl SyncSubject {
    /// Job argument for sattel: `{}` for all crawlers, else `{"crawlers":[...]}`.
    ///
    /// A subset that cannot be encoded is an error, never a run over all crawlers.
    pub fn to_json_args(&self) -> Result<String, SyncError> {
        match self {
            SyncSubject::All => Ok("{}".to_string()),
            SyncSubject::Crawlers(crawlers) => serde_json::to_string(&CrawlerArgs { crawlers })
                .map_err(|err| SyncError::Launch(format!("invalid job arguments: {err}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Crawl {
        generation: RunGeneration,
        name: String,
    },
    Request {
        generation: RunGeneration,
        subject: RequestSubject,
    },
    LoginFailed {
        generation: RunGeneration,
    },
    ProgressBar {
        generation: RunGeneration,
        message: BarMessage,
    },
    /// The run stopped, normally, by cancellation, or with an error.
    SyncSettled {
        generation: RunGeneration,
        result: Result<(), SyncError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_progress_bar_line() {
        let line = r#"{"kind":"progressBar","id":3,"event":{"kind":"begin","bar":"download","path":"a/b.pdf"}}"#;
        let message: SattelMessage = serde_json::from_str(line).unwrap();

        assert_eq!(
            message,
            SattelMessage::ProgressBar(BarMessage {
                id: 3,
                event: BarEvent::Begin {
                    bar: BarKind::Download,
                    path: "a/b.pdf".to_string(),
                },
            })
        );
    }

    #[test]
    fn decodes_set_total_and_error_lines() {
        let total: SattelMessage =
            serde_json::from_str(r#"{"kind":"progressBar","id":1,"event":{"kind":"setTotal","total":2000}}"#)
                .unwrap();
        assert_eq!(
            total,
            SattelMessage::ProgressBar(BarMessage {
                id: 1,
                event: BarEvent::SetTotal { total: 2000 },
            })
        );

        let error: SattelMessage = serde_json::from_str(
            r#"{"kind":"error","exception":"LoginError","message":"bad realm"}"#,
        )
        .unwrap();
        assert_eq!(
            error,
            SattelMessage::Error(BackendFailure {
                exception: "LoginError".to_string(),
                message: "bad realm".to_string(),
            })
        );
    }

    #[test]
    fn decodes_request_subjects() {
        let request: SattelMessage =
            serde_json::from_str(r#"{"kind":"request","subject":"jsonArgs"}"#).unwrap();
        assert_eq!(
            request,
            SattelMessage::Request {
                subject: RequestSubject::JsonArgs
            }
        );
    }

    #[test]
    fn job_arguments() {
        assert_eq!(SyncSubject::All.to_json_args().unwrap(), "{}");
        assert_eq!(
            SyncSubject::Crawlers(vec!["Analysis".into(), "Linear \"Algebra\"".into()])
                .to_json_args()
                .unwrap(),
            r#"{"crawlers":["Analysis","Linear \"Algebra\""]}"#
        );
        assert_eq!(
            SyncSubject::Crawlers(Vec::new()).to_json_args().unwrap(),
            r#"{"crawlers":[]}"#
        );
    }
}
