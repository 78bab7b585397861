//! Retry helpers for the outbound API clients (Groq, Telegram).

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

pub const INITIAL_BACKOFF_MS: u64 = 1_000;
pub const MAX_BACKOFF_MS: u64 = 60_000;
pub const MAX_RETRIES: usize = 3;

/// Backoff settings for transient API failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Retries after the first attempt.
    pub max_retries: usize,
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: MAX_RETRIES,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_retries,
            with_jitter: true,
        }
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Build the exponential backoff strategy.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Run `operation`, retrying errors for which `is_retryable` returns true.
///
/// `retry_after` extracts a wait hint (e.g. a 429 `retry_after`) from the
/// error. The hint only stretches the delay; the retry count still comes
/// from `config`. Each retry is logged at debug level with `context` and
/// the first line of the error.
pub async fn with_retry_after<T, E, F, Fut, IsRetryable, RetryAfter>(
    operation: F,
    config: &RetryConfig,
    is_retryable: IsRetryable,
    mut retry_after: RetryAfter,
    context: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error,
    IsRetryable: FnMut(&E) -> bool,
    RetryAfter: FnMut(&E) -> Option<Duration>,
{
    let attempt = AtomicU32::new(1);

    operation
        .retry(config.clone().into_backoff())
        .when(is_retryable)
        .adjust(|err: &E, dur: Option<Duration>| {
            dur.map(|backoff| retry_after(err).map_or(backoff, |hint| backoff.max(hint)))
        })
        .notify(|err: &E, dur: Duration| {
            let current = attempt.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(
                context,
                attempt = current,
                retry_in = ?dur,
                error = %short_error_message(err),
                "Retrying after transient error"
            );
        })
        .await
}

/// First line of an error's display text.
#[must_use]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}
