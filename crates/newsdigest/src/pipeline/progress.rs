//! Progress events emitted while a cycle runs.

use super::CycleReport;

/// Stage of per-article processing that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Summarize,
    Publish,
    Store,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Summarize => "summarize",
            Stage::Publish => "publish",
            Stage::Store => "store",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum PipelineProgress {
    /// A cycle over `categories` categories is starting.
    CycleStarted { categories: usize, dry_run: bool },

    /// Crawling the listing pages of a category.
    CrawlingCategory {
        category: String,
        /// 1-indexed position in the cycle.
        index: usize,
        total: usize,
    },

    /// New articles found for a category.
    Crawled { category: String, count: usize },

    Summarized { url: String },

    /// Article sent to Telegram (or skipped in a dry run).
    Published { url: String, dry_run: bool },

    ArticleFailed {
        url: String,
        stage: Stage,
        error: String,
    },

    CategoryComplete { category: String },

    CycleComplete { report: CycleReport },

    /// Waiting before the next cycle.
    Sleeping { secs: u64 },

    /// The shutdown signal stopped the cycle early.
    Interrupted,
}

/// Callback for progress updates during a cycle.
pub type ProgressCallback = Box<dyn Fn(PipelineProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: PipelineProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
