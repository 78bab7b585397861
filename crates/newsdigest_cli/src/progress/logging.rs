use newsdigest::PipelineProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: PipelineProgress) {
        match event {
            PipelineProgress::CycleStarted {
                categories,
                dry_run,
            } => {
                tracing::debug!(categories, dry_run, "Cycle started");
            }

            PipelineProgress::CrawlingCategory {
                category,
                index,
                total,
            } => {
                tracing::debug!(category = %category, index, total, "Crawling category");
            }

            PipelineProgress::Crawled { category, count } => {
                tracing::info!(category = %category, count, "Found new articles");
            }

            PipelineProgress::Summarized { url } => {
                tracing::debug!(url = %url, "Summarized");
            }

            PipelineProgress::Published { url, dry_run } => {
                if dry_run {
                    tracing::debug!(url = %url, "Would publish");
                } else {
                    tracing::debug!(url = %url, "Published");
                }
            }

            PipelineProgress::ArticleFailed { url, stage, error } => {
                tracing::debug!(url = %url, stage = %stage, error = %error, "Article failed");
            }

            PipelineProgress::CategoryComplete { category } => {
                tracing::debug!(category = %category, "Category complete");
            }

            PipelineProgress::CycleComplete { report } => {
                tracing::debug!(?report, "Cycle complete");
            }

            PipelineProgress::Sleeping { secs } => {
                tracing::info!(secs, "Waiting for next cycle");
            }

            PipelineProgress::Interrupted => {
                tracing::warn!("Cycle interrupted by shutdown");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
