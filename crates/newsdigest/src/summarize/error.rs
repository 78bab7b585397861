use std::time::Duration;

use thiserror::Error;

use crate::http::HttpError;

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Groq API key is not configured")]
    MissingApiKey,

    #[error("nothing to summarize")]
    EmptyInput,

    #[error("transport error: {0}")]
    Http(#[from] HttpError),

    #[error("rate limited by the completion API")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("completion API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("completion response had no content")]
    EmptyResponse,

    #[error("summary still too short after {attempts} attempts")]
    TooShort { attempts: u32 },
}

impl SummarizeError {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(SummarizeError::RateLimited {
            retry_after_secs: None
        }
        .is_transient());
        assert!(SummarizeError::Api {
            status: 502,
            message: "bad gateway".into()
        }
        .is_transient());
        assert!(SummarizeError::Http(HttpError::Timeout("t".into())).is_transient());

        assert!(!SummarizeError::Api {
            status: 401,
            message: "invalid key".into()
        }
        .is_transient());
        assert!(!SummarizeError::Http(HttpError::Decode("x".into())).is_transient());
        assert!(!SummarizeError::TooShort { attempts: 3 }.is_transient());
        assert!(!SummarizeError::MissingApiKey.is_transient());
    }
}
