use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::SummarizeError;
use super::prompt::{build_prompt, is_long_enough};
use super::Summarizer;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpTransport};
use crate::retry::{RetryConfig, with_retry_after};

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "mixtral-8x7b-32768";

/// Completion requests can take a while for long articles.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct GroqOptions {
    /// Base URL of the OpenAI-compatible API, without `/chat/completions`.
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Completions requested per text before giving up on a too-short summary.
    pub max_attempts: u32,
    /// Cached summaries kept in memory before the cache is reset.
    pub cache_capacity: usize,
    pub retry: RetryConfig,
}

impl Default for GroqOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 8192,
            max_attempts: 3,
            cache_capacity: 512,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Summarizer backed by Groq chat completions.
///
/// Accepted summaries are cached in memory by input text, so a text seen
/// twice in one process costs one completion.
pub struct GroqSummarizer {
    transport: Arc<dyn HttpTransport>,
    api_key: String,
    options: GroqOptions,
    cache: Mutex<HashMap<String, String>>,
}

impl GroqSummarizer {
    pub fn new(api_key: impl Into<String>, options: GroqOptions) -> Result<Self, SummarizeError> {
        let transport = ReqwestTransport::with_timeout(
            REQUEST_TIMEOUT,
            concat!("newsdigest/", env!("CARGO_PKG_VERSION")),
        )?;
        Self::with_transport(Arc::new(transport), api_key, options)
    }

    pub fn with_transport(
        transport: Arc<dyn HttpTransport>,
        api_key: impl Into<String>,
        options: GroqOptions,
    ) -> Result<Self, SummarizeError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SummarizeError::MissingApiKey);
        }
        Ok(Self {
            transport,
            api_key,
            options,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.options.endpoint.trim_end_matches('/')
        )
    }

    fn cached(&self, text: &str) -> Option<String> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(text)
            .cloned()
    }

    fn remember(&self, text: &str, summary: &str) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if cache.len() >= self.options.cache_capacity.max(1) {
            cache.clear();
        }
        cache.insert(text.to_string(), summary.to_string());
    }

    /// One completion call; the returned content is trimmed.
    async fn complete(&self, prompt: &str) -> Result<String, SummarizeError> {
        let payload = ChatRequest {
            model: &self.options.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
        };
        let request = HttpRequest::post_json(self.completions_url(), &payload)?
            .with_header("Authorization", format!("Bearer {}", self.api_key));

        let response = self.transport.send(request).await?;

        if response.status == 429 {
            return Err(SummarizeError::RateLimited {
                retry_after_secs: response
                    .header("Retry-After")
                    .and_then(|v| v.trim().parse().ok()),
            });
        }
        if !response.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .map(|body| body.error.message)
                .unwrap_or_else(|_| response.text());
            return Err(SummarizeError::Api {
                status: response.status,
                message,
            });
        }

        let body: ChatResponse = response.json()?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(SummarizeError::EmptyResponse);
        }
        Ok(content)
    }
}

#[async_trait]
impl Summarizer for GroqSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        if text.trim().is_empty() {
            return Err(SummarizeError::EmptyInput);
        }
        if let Some(summary) = self.cached(text) {
            tracing::debug!("Summary cache hit");
            return Ok(summary);
        }

        let prompt = build_prompt(text);
        let attempts = self.options.max_attempts.max(1);

        for attempt in 1..=attempts {
            let summary = with_retry_after(
                || self.complete(&prompt),
                &self.options.retry,
                SummarizeError::is_transient,
                SummarizeError::retry_after,
                "groq completion",
            )
            .await?;

            if is_long_enough(&summary) {
                self.remember(text, &summary);
                return Ok(summary);
            }
            tracing::info!(attempt, attempts, "Summary too short, retrying");
        }

        Err(SummarizeError::TooShort { attempts })
    }
}
