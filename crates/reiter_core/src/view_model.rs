use std::collections::BTreeMap;

use crate::{AppState, ProgressBarKind, ProgressId, ProgressItem, PromptKind, QueuedRun};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub running: bool,
    pub queued: QueuedRun,
    /// `Crawling <name>`, `Starting…` or `Idle`.
    pub status: String,
    pub running_bars: Vec<ProgressBarView>,
    pub finished_bars: Vec<ProgressBarView>,
    pub prompt: Option<PromptView>,
    pub login_failed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarFill {
    /// Total unknown, or a crawl bar.
    Indeterminate,
    Determinate { value: u64, max: u64 },
    /// Finished downloads are always drawn full.
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressBarView {
    pub id: ProgressId,
    pub kind: ProgressBarKind,
    pub path: String,
    pub fill: BarFill,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptView {
    pub kind: PromptKind,
    /// Password input is masked.
    pub input: String,
    pub cursor: usize,
    pub error: Option<String>,
}

impl AppViewModel {
    pub(crate) fn from_state(state: &AppState) -> Self {
        let controller = state.controller();
        let session = state.session();
        let status = match (controller.is_running(), session.current_crawler()) {
            (true, Some(crawler)) => format!("Crawling {crawler}"),
            (true, None) => "Starting…".to_string(),
            (false, _) => "Idle".to_string(),
        };
        let prompt = state.relay().prompt().map(|prompt| PromptView {
            kind: prompt.kind,
            input: match prompt.kind {
                PromptKind::Username => prompt.input.clone(),
                PromptKind::Password => "*".repeat(prompt.input.chars().count()),
            },
            cursor: prompt.cursor,
            error: prompt.error.clone(),
        });

        Self {
            running: controller.is_running(),
            queued: controller.queued().clone(),
            status,
            running_bars: bars(session.ledger().running(), running_bar),
            finished_bars: bars(session.ledger().finished(), finished_bar),
            prompt,
            login_failed: state.relay().login_failed(),
        }
    }
}

fn bars(
    items: &BTreeMap<ProgressId, ProgressItem>,
    view: fn(ProgressId, &ProgressItem) -> ProgressBarView,
) -> Vec<ProgressBarView> {
    items.iter().map(|(id, item)| view(*id, item)).collect()
}

fn running_bar(id: ProgressId, item: &ProgressItem) -> ProgressBarView {
    let (fill, caption) = match item.kind {
        ProgressBarKind::Crawl => (BarFill::Indeterminate, "Crawling".to_string()),
        ProgressBarKind::Download => {
            let fill = match item.total {
                Some(max) => BarFill::Determinate {
                    value: item.progress,
                    max,
                },
                None => BarFill::Indeterminate,
            };
            (fill, download_caption(item))
        }
    };
    ProgressBarView {
        id,
        kind: item.kind,
        path: item.path.clone(),
        fill,
        caption,
    }
}

fn finished_bar(id: ProgressId, item: &ProgressItem) -> ProgressBarView {
    ProgressBarView {
        id,
        kind: item.kind,
        path: item.path.clone(),
        fill: BarFill::Complete,
        caption: download_caption(item),
    }
}

fn download_caption(item: &ProgressItem) -> String {
    match item.total {
        Some(total) => format!("{} / {}", format_bytes(item.progress), format_bytes(total)),
        None => format_bytes(item.progress),
    }
}

/// Formats a byte count: literal bytes below 1 KiB, then KB, then MB with two decimals.
pub fn format_bytes(bytes: u64) -> String {
    match bytes {
        1 => "1 byte".to_string(),
        b if b < KIB => format!("{b} bytes"),
        b if b < MIB => format!("{} KB", two_decimals(b, KIB)),
        b => format!("{} MB", two_decimals(b, MIB)),
    }
}

// Rounds half up, in integer arithmetic so results do not depend on float formatting.
fn two_decimals(value: u64, unit: u64) -> String {
    let hundredths = (u128::from(value) * 100 + u128::from(unit) / 2) / u128::from(unit);
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}
