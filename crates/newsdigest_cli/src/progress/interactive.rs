use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use newsdigest::PipelineProgress;

#[derive(Default)]
struct ProgressState {
    /// One bar for the whole cycle, advanced per category.
    cycle_bar: Option<ProgressBar>,
    /// Bar of the category being processed.
    category_bar: Option<ProgressBar>,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    pub fn handle(&self, event: PipelineProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            PipelineProgress::CycleStarted {
                categories,
                dry_run,
            } => {
                let pb = self.multi.add(ProgressBar::new(categories as u64));
                pb.set_style(Self::bar_style());
                pb.set_prefix(format!("{:14}", "Cycle"));
                if dry_run {
                    pb.set_message("dry run");
                }
                state.cycle_bar = Some(pb);
            }

            PipelineProgress::CrawlingCategory { category, .. } => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(Duration::from_millis(100));
                pb.set_prefix(format!("{category:14}"));
                pb.set_message("Crawling...");
                state.category_bar = Some(pb);
            }

            PipelineProgress::Crawled { count, .. } => {
                if let Some(ref pb) = state.category_bar {
                    pb.disable_steady_tick();
                    pb.set_length(count as u64);
                    pb.set_style(Self::bar_style());
                    pb.set_message(format!("{count} new"));
                }
            }

            PipelineProgress::Summarized { url } => {
                if let Some(ref pb) = state.category_bar {
                    pb.set_message(format!("Publishing {url}"));
                }
            }

            PipelineProgress::Published { .. } => {
                if let Some(ref pb) = state.category_bar {
                    pb.inc(1);
                }
            }

            PipelineProgress::ArticleFailed { url, stage, error } => {
                if let Some(ref pb) = state.category_bar {
                    pb.inc(1);
                }
                self.multi
                    .println(format!("  ✗ {url} ({stage}): {error}"))
                    .ok();
            }

            PipelineProgress::CategoryComplete { .. } => {
                if let Some(pb) = state.category_bar.take() {
                    pb.finish_with_message("done");
                }
                if let Some(ref pb) = state.cycle_bar {
                    pb.inc(1);
                }
            }

            PipelineProgress::CycleComplete { report } => {
                if let Some(pb) = state.cycle_bar.take() {
                    pb.finish_with_message(format!(
                        "{} crawled, {} published, {} failed",
                        report.crawled, report.published, report.failed
                    ));
                }
            }

            PipelineProgress::Sleeping { secs } => {
                self.multi
                    .println(format!("Next cycle in {}", humanize_secs(secs)))
                    .ok();
            }

            PipelineProgress::Interrupted => {
                if let Some(pb) = state.category_bar.take() {
                    pb.abandon_with_message("interrupted");
                }
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for pb in [&state.category_bar, &state.cycle_bar].into_iter().flatten() {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// `3600` -> `1h`, `90` -> `1m 30s`.
fn humanize_secs(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
    let parts: Vec<String> = [(h, "h"), (m, "m"), (s, "s")]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect();
    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanize_secs_formats_units() {
        assert_eq!(humanize_secs(3600), "1h");
        assert_eq!(humanize_secs(90), "1m 30s");
        assert_eq!(humanize_secs(3725), "1h 2m 5s");
        assert_eq!(humanize_secs(0), "0s");
    }

    #[test]
    fn handles_full_cycle_without_panicking() {
        let reporter = InteractiveReporter::new();
        reporter.handle(PipelineProgress::CycleStarted {
            categories: 1,
            dry_run: false,
        });
        reporter.handle(PipelineProgress::CrawlingCategory {
            category: "tin-nong".to_string(),
            index: 1,
            total: 1,
        });
        reporter.handle(PipelineProgress::Crawled {
            category: "tin-nong".to_string(),
            count: 1,
        });
        reporter.handle(PipelineProgress::Published {
            url: "https://vnexpress.net/a.html".to_string(),
            dry_run: false,
        });
        reporter.handle(PipelineProgress::CategoryComplete {
            category: "tin-nong".to_string(),
        });
        reporter.finish();
    }
}
