use reiter_core::{AppViewModel, ProgressBarView, PromptView, QueuedRun, LOGIN_FAILED_TEXT};

/// Top line: run status, queue and how many downloads are done.
pub fn status_line(view: &AppViewModel) -> String {
    let queued = match &view.queued {
        QueuedRun::Nothing => String::new(),
        QueuedRun::All => " | queued: all crawlers".to_string(),
        QueuedRun::Crawlers(names) => format!(" | queued: {}", names.join(", ")),
    };
    let finished = match view.finished_bars.len() {
        0 => String::new(),
        n => format!(" | finished downloads: {n}"),
    };
    format!("[{}]{}{}", view.status, queued, finished)
}

pub fn bar_message(bar: &ProgressBarView) -> String {
    format!("{} {}", bar.path, bar.caption)
}

/// Lines printed above the bars: login banner, prompt and the last notice.
pub fn text_lines(view: &AppViewModel, notice: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();

    // An open prompt carries the login failure as its own error.
    if view.login_failed && view.prompt.is_none() {
        lines.push(format!("! {LOGIN_FAILED_TEXT} (:dismiss to hide)"));
    }
    if let Some(prompt) = &view.prompt {
        lines.extend(prompt_lines(prompt));
    }
    if let Some(notice) = notice {
        lines.push(notice.to_string());
    }
    lines
}

fn prompt_lines(prompt: &PromptView) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);
    if let Some(error) = &prompt.error {
        lines.push(format!("  {error}"));
    }
    lines.push(format!("{}: {}", prompt.kind.label(), prompt.input));
    lines
}
