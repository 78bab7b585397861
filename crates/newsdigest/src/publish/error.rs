use std::time::Duration;

use thiserror::Error;

use crate::http::HttpError;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Telegram bot token is not configured")]
    MissingBotToken,

    #[error("Telegram chat id is not configured")]
    MissingChatId,

    #[error("transport error: {0}")]
    Http(#[from] HttpError),

    #[error("rate limited by Telegram")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Telegram API error (HTTP {status}): {description}")]
    Api { status: u16, description: String },

    #[error("no recent chat history; send a message to the bot first")]
    NoUpdates,
}

impl PublishError {
    /// Errors worth retrying with backoff.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Http(HttpError::Timeout(_) | HttpError::Transport(_)) => true,
            _ => false,
        }
    }

    /// Wait the server asked for before the next attempt.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited {
                retry_after_secs: Some(secs),
            } => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }
}
