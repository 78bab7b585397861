//! Crawl, summarize, publish, record.
//!
//! [`Pipeline::run_cycle`] makes one pass over the configured categories and
//! [`Pipeline::run_forever`] repeats it on a fixed interval until the shutdown
//! signal fires.

mod progress;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

use crate::category::Category;
use crate::crawler::{Article, NewsCrawler};
use crate::publish::{PublishError, Publisher};
use crate::store::{ArticleStore, StoreError};
use crate::summarize::{SummarizeError, Summarizer};

pub use progress::{PipelineProgress, ProgressCallback, Stage, emit};

pub const DEFAULT_ARTICLE_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_CATEGORY_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3600);

/// Receiving side of the shutdown signal; `true` means stop.
pub type ShutdownSignal = watch::Receiver<bool>;

/// A fresh shutdown signal. Send `true` to request shutdown.
pub fn shutdown_channel() -> (watch::Sender<bool>, ShutdownSignal) {
    watch::channel(false)
}

/// Sleep for `duration` unless shutdown is requested first.
///
/// Returns `true` when shutdown was requested. A dropped sender never
/// requests shutdown.
pub async fn sleep_or_shutdown(duration: Duration, shutdown: &ShutdownSignal) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    let mut rx = shutdown.clone();
    tokio::select! {
        () = tokio::time::sleep(duration) => false,
        Ok(_) = rx.wait_for(|stop| *stop) => true,
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("summarize failed: {0}")]
    Summarize(#[from] SummarizeError),
    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),
    #[error("store failed: {0}")]
    Store(#[from] StoreError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Summarize(_) => Stage::Summarize,
            PipelineError::Publish(_) => Stage::Publish,
            PipelineError::Store(_) => Stage::Store,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Category slugs, processed in order. Defaults to the trending feeds.
    pub categories: Vec<String>,
    pub article_delay: Duration,
    pub category_delay: Duration,
    pub interval: Duration,
    /// Crawl and summarize only.
    pub dry_run: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            categories: Category::TRENDING
                .iter()
                .map(|c| c.slug().to_string())
                .collect(),
            article_delay: DEFAULT_ARTICLE_DELAY,
            category_delay: DEFAULT_CATEGORY_DELAY,
            interval: DEFAULT_INTERVAL,
            dry_run: false,
        }
    }
}

/// Counters for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub categories: usize,
    pub crawled: usize,
    pub summarized: usize,
    pub published: usize,
    pub stored: usize,
    pub failed: usize,
}

pub struct Pipeline {
    crawler: NewsCrawler,
    summarizer: Arc<dyn Summarizer>,
    publisher: Option<Arc<dyn Publisher>>,
    store: ArticleStore,
    options: PipelineOptions,
}

impl Pipeline {
    /// A pipeline without a publisher runs as a dry run.
    pub fn new(
        crawler: NewsCrawler,
        summarizer: Arc<dyn Summarizer>,
        store: ArticleStore,
        options: PipelineOptions,
    ) -> Self {
        Self {
            crawler,
            summarizer,
            publisher: None,
            store,
            options,
        }
    }

    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run || self.publisher.is_none()
    }

    /// One pass over all configured categories.
    ///
    /// Per-article failures are logged and counted; they never abort the
    /// cycle. Shutdown is checked between articles and during delays.
    pub async fn run_cycle(
        &self,
        shutdown: &ShutdownSignal,
        on_progress: Option<&ProgressCallback>,
    ) -> CycleReport {
        let dry_run = self.is_dry_run();
        let total = self.options.categories.len();
        let mut report = CycleReport::default();

        tracing::info!(categories = total, dry_run, "Starting article processing");
        emit(
            on_progress,
            PipelineProgress::CycleStarted {
                categories: total,
                dry_run,
            },
        );

        'categories: for (index, category) in self.options.categories.iter().enumerate() {
            if *shutdown.borrow() {
                emit(on_progress, PipelineProgress::Interrupted);
                break;
            }

            tracing::info!(category = %category, "Processing category");
            emit(
                on_progress,
                PipelineProgress::CrawlingCategory {
                    category: category.clone(),
                    index: index + 1,
                    total,
                },
            );

            let articles = self.crawler.latest_articles(category).await;
            report.categories += 1;
            report.crawled += articles.len();
            emit(
                on_progress,
                PipelineProgress::Crawled {
                    category: category.clone(),
                    count: articles.len(),
                },
            );

            for article in &articles {
                if *shutdown.borrow() {
                    emit(on_progress, PipelineProgress::Interrupted);
                    break 'categories;
                }

                if let Err(err) = self
                    .process_article(article, dry_run, &mut report, on_progress)
                    .await
                {
                    report.failed += 1;
                    tracing::error!(
                        url = %article.url,
                        stage = %err.stage(),
                        error = %err,
                        "Article processing failed"
                    );
                    emit(
                        on_progress,
                        PipelineProgress::ArticleFailed {
                            url: article.url.clone(),
                            stage: err.stage(),
                            error: err.to_string(),
                        },
                    );
                }

                if sleep_or_shutdown(self.options.article_delay, shutdown).await {
                    emit(on_progress, PipelineProgress::Interrupted);
                    break 'categories;
                }
            }

            emit(
                on_progress,
                PipelineProgress::CategoryComplete {
                    category: category.clone(),
                },
            );

            if sleep_or_shutdown(self.options.category_delay, shutdown).await {
                emit(on_progress, PipelineProgress::Interrupted);
                break;
            }
        }

        tracing::info!(
            categories = report.categories,
            crawled = report.crawled,
            summarized = report.summarized,
            published = report.published,
            stored = report.stored,
            failed = report.failed,
            "Processing completed"
        );
        emit(
            on_progress,
            PipelineProgress::CycleComplete {
                report: report.clone(),
            },
        );
        report
    }

    async fn process_article(
        &self,
        article: &Article,
        dry_run: bool,
        report: &mut CycleReport,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<(), PipelineError> {
        if article.content.trim().is_empty() {
            return Ok(());
        }

        let summary = self.summarizer.summarize(&article.content).await?;
        if summary.trim().is_empty() {
            tracing::warn!(url = %article.url, "Empty summary, skipping");
            return Ok(());
        }
        report.summarized += 1;
        emit(
            on_progress,
            PipelineProgress::Summarized {
                url: article.url.clone(),
            },
        );

        let publisher = match &self.publisher {
            Some(publisher) if !dry_run => publisher,
            _ => {
                tracing::info!(url = %article.url, title = %article.title, "Dry run, not publishing");
                emit(
                    on_progress,
                    PipelineProgress::Published {
                        url: article.url.clone(),
                        dry_run: true,
                    },
                );
                return Ok(());
            }
        };

        publisher.publish(article, &summary).await?;
        report.published += 1;
        emit(
            on_progress,
            PipelineProgress::Published {
                url: article.url.clone(),
                dry_run: false,
            },
        );

        self.store.record(article, &summary).await?;
        report.stored += 1;
        Ok(())
    }

    /// Run cycles every `interval` until shutdown. Returns the number of
    /// cycles started.
    pub async fn run_forever(
        &self,
        shutdown: &ShutdownSignal,
        on_progress: Option<&ProgressCallback>,
    ) -> u64 {
        tracing::info!(
            interval_secs = self.options.interval.as_secs(),
            "Starting news crawler"
        );

        let mut cycles = 0;
        while !*shutdown.borrow() {
            self.run_cycle(shutdown, on_progress).await;
            cycles += 1;

            emit(
                on_progress,
                PipelineProgress::Sleeping {
                    secs: self.options.interval.as_secs(),
                },
            );
            if sleep_or_shutdown(self.options.interval, shutdown).await {
                break;
            }
        }

        tracing::info!(cycles, "Crawler stopped");
        cycles
    }
}
