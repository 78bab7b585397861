use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::PublishError;
use super::message::format_message;
use super::Publisher;
use crate::crawler::Article;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::rate_limit::{ApiRateLimiter, rate_limits};
use crate::retry::{RetryConfig, with_retry_after};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct TelegramOptions {
    pub api_base: String,
    pub requests_per_second: u32,
    pub retry: RetryConfig,
}

impl Default for TelegramOptions {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            requests_per_second: rate_limits::TELEGRAM_DEFAULT_RPS,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Update {
    #[serde(default)]
    message: Option<UpdateMessage>,
    #[serde(default)]
    edited_message: Option<UpdateMessage>,
    #[serde(default)]
    channel_post: Option<UpdateMessage>,
}

#[derive(Debug, Deserialize)]
struct UpdateMessage {
    chat: Chat,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    title: Option<String>,
}

/// Chat found through `getUpdates`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInfo {
    pub id: i64,
    /// `private`, `group`, `supergroup` or `channel`.
    pub kind: String,
    pub title: String,
}

/// Publishes summaries through the Telegram Bot API.
pub struct TelegramPublisher {
    transport: Arc<dyn HttpTransport>,
    bot_token: String,
    chat_id: String,
    limiter: ApiRateLimiter,
    options: TelegramOptions,
}

impl TelegramPublisher {
    pub fn new(
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        options: TelegramOptions,
    ) -> Result<Self, PublishError> {
        let transport = ReqwestTransport::with_timeout(
            REQUEST_TIMEOUT,
            concat!("newsdigest/", env!("CARGO_PKG_VERSION")),
        )?;
        Self::with_transport(Arc::new(transport), bot_token, chat_id, options)
    }

    pub fn with_transport(
        transport: Arc<dyn HttpTransport>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        options: TelegramOptions,
    ) -> Result<Self, PublishError> {
        let bot_token = bot_token.into();
        if bot_token.trim().is_empty() {
            return Err(PublishError::MissingBotToken);
        }
        Ok(Self {
            transport,
            bot_token,
            chat_id: chat_id.into(),
            limiter: ApiRateLimiter::new(options.requests_per_second),
            options,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.options.api_base.trim_end_matches('/'),
            self.bot_token,
            method
        )
    }

    async fn send_message(&self, text: &str) -> Result<(), PublishError> {
        self.limiter.wait().await;

        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: false,
        };
        let request = HttpRequest::post_json(self.method_url("sendMessage"), &payload)?;
        let response = self.transport.send(request).await?;
        decode::<serde_json::Value>(&response)?;
        Ok(())
    }

    /// Most recent chat that wrote to the bot, from `getUpdates`.
    pub async fn discover_chat_id(&self) -> Result<ChatInfo, PublishError> {
        let response = self
            .transport
            .send(HttpRequest::get(self.method_url("getUpdates")))
            .await?;
        let updates: Vec<Update> = decode(&response)?.unwrap_or_default();

        updates
            .into_iter()
            .rev()
            .find_map(|update| {
                update
                    .message
                    .or(update.channel_post)
                    .or(update.edited_message)
            })
            .map(|message| ChatInfo {
                id: message.chat.id,
                kind: message.chat.kind,
                title: message
                    .chat
                    .title
                    .unwrap_or_else(|| "Private Chat".to_string()),
            })
            .ok_or(PublishError::NoUpdates)
    }
}

/// Unwrap a Bot API envelope, mapping `ok: false` and HTTP failures to errors.
fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<Option<T>, PublishError> {
    let envelope = response.json::<ApiResponse<T>>();

    match envelope {
        Ok(body) if body.ok && response.is_success() => Ok(body.result),
        Ok(body) => {
            let retry_after_secs = body.parameters.and_then(|p| p.retry_after);
            if response.status == 429 {
                return Err(PublishError::RateLimited { retry_after_secs });
            }
            Err(PublishError::Api {
                status: response.status,
                description: body
                    .description
                    .unwrap_or_else(|| "request was not successful".to_string()),
            })
        }
        Err(_) if response.status == 429 => Err(PublishError::RateLimited {
            retry_after_secs: None,
        }),
        Err(err) if response.is_success() => Err(err.into()),
        Err(_) => Err(PublishError::Api {
            status: response.status,
            description: response.text(),
        }),
    }
}

#[async_trait]
impl Publisher for TelegramPublisher {
    async fn publish(&self, article: &Article, summary: &str) -> Result<(), PublishError> {
        if self.chat_id.trim().is_empty() {
            return Err(PublishError::MissingChatId);
        }

        let text = format_message(article, summary);
        with_retry_after(
            || self.send_message(&text),
            &self.options.retry,
            PublishError::is_transient,
            PublishError::retry_after,
            "telegram sendMessage",
        )
        .await?;

        tracing::info!(url = %article.url, chat_id = %self.chat_id, "Posted to Telegram");
        Ok(())
    }
}
