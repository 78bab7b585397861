//! newsdigest - VnExpress news summaries posted to Telegram.
//!
//! The library crawls VnExpress category listings, summarizes new articles
//! with a Groq-hosted LLM, posts the summaries to a Telegram chat and records
//! every posted article in SQLite so it is never posted twice.
//!
//! # Features
//!
//! - `sqlite` - SQLite driver for SeaORM (default).
//! - `migrate` - Enables database migration support. When enabled, you can use
//!   [`connect_and_migrate`] to run migrations on connection.
//!
//! # Example
//!
//! ```ignore
//! use newsdigest::{ArticleStore, NewsCrawler, CrawlOptions, connect_and_migrate};
//!
//! let db = connect_and_migrate("sqlite://data/crawled_articles.db?mode=rwc").await?;
//! let store = ArticleStore::new(db);
//! let crawler = NewsCrawler::new(CrawlOptions::default())?.with_store(store.clone());
//!
//! for article in crawler.latest_articles("tin-nong").await {
//!     println!("{} {}", article.url, article.title);
//! }
//! ```

pub mod category;
pub mod crawler;
pub mod db;
pub mod entity;
pub mod http;
pub mod pipeline;
pub mod publish;
pub mod rate_limit;
pub mod retry;
pub mod store;
pub mod summarize;

#[cfg(feature = "migrate")]
pub mod migration;

pub use category::{Category, UnknownCategory};
pub use crawler::{Article, ArticleContent, CrawlError, CrawlOptions, NewsCrawler};
pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use pipeline::{
    CycleReport, Pipeline, PipelineError, PipelineOptions, PipelineProgress, ProgressCallback,
    ShutdownSignal, shutdown_channel,
};
pub use publish::{PublishError, Publisher, TelegramOptions, TelegramPublisher};
pub use rate_limit::{ApiRateLimiter, rate_limits};
pub use store::{ArticleStore, StoreError};
pub use summarize::{GroqOptions, GroqSummarizer, SummarizeError, Summarizer};
