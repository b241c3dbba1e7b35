use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use reiter_core::{AppViewModel, BarFill, ProgressBarView, ProgressId};

use super::render;

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Spinner,
    Gauge,
}

struct LiveBar {
    bar: ProgressBar,
    shape: Shape,
    finished: bool,
}

/// Terminal progress display driven by the view model.
///
/// One status spinner on top, one indicatif bar per progress id below it. Text such as
/// prompts is printed above the bars, and only when it changes.
pub struct Board {
    multi: MultiProgress,
    status: ProgressBar,
    bars: BTreeMap<ProgressId, LiveBar>,
    printed: Vec<String>,
}

impl Board {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);
        let status = multi.add(ProgressBar::new_spinner());
        status.set_style(spinner_style());
        Self {
            multi,
            status,
            bars: BTreeMap::new(),
            printed: Vec::new(),
        }
    }

    pub fn draw(&mut self, view: &AppViewModel, notice: Option<&str>) {
        self.status.set_message(render::status_line(view));
        if view.running {
            self.status.enable_steady_tick(TICK);
        } else {
            self.status.disable_steady_tick();
            self.status.tick();
        }

        let lines = render::text_lines(view, notice);
        if lines != self.printed {
            for line in &lines {
                self.print(line);
            }
            self.printed = lines;
        }

        let shown: BTreeSet<ProgressId> = view
            .running_bars
            .iter()
            .chain(&view.finished_bars)
            .map(|bar| bar.id)
            .collect();
        let gone: Vec<ProgressId> = self
            .bars
            .keys()
            .filter(|id| !shown.contains(id))
            .copied()
            .collect();
        for id in gone {
            if let Some(live) = self.bars.remove(&id) {
                self.retire(live);
            }
        }

        for bar in view.running_bars.iter().chain(&view.finished_bars) {
            self.show(bar);
        }
    }

    /// Clears the live area; finished downloads stay in the scrollback.
    pub fn finish(&mut self) {
        for (_, live) in std::mem::take(&mut self.bars) {
            self.retire(live);
        }
        self.status.finish();
    }

    fn show(&mut self, view: &ProgressBarView) {
        let shape = match view.fill {
            BarFill::Indeterminate => Shape::Spinner,
            BarFill::Determinate { .. } | BarFill::Complete => Shape::Gauge,
        };
        let multi = &self.multi;
        let live = self.bars.entry(view.id).or_insert_with(|| {
            let mut live = LiveBar {
                bar: multi.add(ProgressBar::new(0)),
                shape,
                finished: false,
            };
            reshape(&mut live, shape);
            live
        });
        if live.finished {
            return;
        }
        if live.shape != shape {
            reshape(live, shape);
        }

        let message = render::bar_message(view);
        match view.fill {
            BarFill::Indeterminate => live.bar.set_message(message),
            BarFill::Determinate { value, max } => {
                // A zero total is drawn as full.
                let (position, length) = if max == 0 { (1, 1) } else { (value.min(max), max) };
                live.bar.set_length(length);
                live.bar.set_position(position);
                live.bar.set_message(message);
            }
            BarFill::Complete => {
                if live.bar.length().unwrap_or(0) == 0 {
                    live.bar.set_length(1);
                }
                live.bar.finish_with_message(message);
                live.finished = true;
            }
        }
    }

    fn retire(&self, live: LiveBar) {
        let message = live.bar.message();
        live.bar.finish_and_clear();
        self.multi.remove(&live.bar);
        if live.finished {
            self.print(&format!("done {message}"));
        }
    }

    fn print(&self, line: &str) {
        if self.multi.is_hidden() {
            println!("{line}");
        } else {
            let _ = self.multi.println(line);
        }
    }
}

fn reshape(live: &mut LiveBar, shape: Shape) {
    live.shape = shape;
    match shape {
        Shape::Spinner => {
            live.bar.set_style(spinner_style());
            live.bar.enable_steady_tick(TICK);
        }
        Shape::Gauge => {
            live.bar.disable_steady_tick();
            live.bar.set_style(gauge_style());
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn gauge_style() -> ProgressStyle {
    ProgressStyle::with_template("[{bar:24.cyan/blue}] {percent:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
}
