//! Posting summaries to Telegram.

mod error;
mod message;
mod telegram;

use async_trait::async_trait;

use crate::crawler::Article;

pub use error::PublishError;
pub use message::{escape_markdown, format_message};
pub use telegram::{ChatInfo, DEFAULT_API_BASE, TelegramOptions, TelegramPublisher};

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, article: &Article, summary: &str) -> Result<(), PublishError>;
}
