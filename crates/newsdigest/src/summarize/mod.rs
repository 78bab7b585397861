//! Article summarization.
//!
//! [`Summarizer`] is the seam the pipeline depends on; [`GroqSummarizer`] is
//! the production implementation talking to Groq's OpenAI-compatible
//! chat completions endpoint.

mod error;
mod groq;
mod prompt;

use async_trait::async_trait;

pub use error::SummarizeError;
pub use groq::{DEFAULT_ENDPOINT, DEFAULT_MODEL, GroqOptions, GroqSummarizer};
pub use prompt::{MIN_SENTENCE_PARTS, build_prompt, is_long_enough};

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize article text. The result is trimmed and non-empty.
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError>;
}
