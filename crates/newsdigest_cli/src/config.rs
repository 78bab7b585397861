//! Configuration file support for newsdigest.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. `GROQ_API_KEY`, `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`
//! 3. Environment variables prefixed with `NEWSDIGEST_`; nested keys use a
//!    double underscore (`NEWSDIGEST_SCHEDULE__INTERVAL_SECS`)
//! 4. Local config file (./newsdigest.toml)
//! 5. XDG config file (~/.config/newsdigest/config.toml)
//! 6. Built-in defaults
//!
//! A `.env` file in the working directory is loaded into the environment
//! before any of the above.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://data/crawled_articles.db?mode=rwc"
//!
//! [crawler]
//! pages = 1
//! concurrency = 5
//! categories = ["tin-xem-nhieu", "tin-nong", "tin-tuc-24h"]
//!
//! [groq]
//! model = "mixtral-8x7b-32768"
//!
//! [telegram]
//! chat_id = "-1001234567890"
//!
//! [schedule]
//! interval_secs = 3600
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config as Settings, Environment, File, FileFormat, Map};
use directories::ProjectDirs;
use newsdigest::crawler::DEFAULT_BASE_URL;
use newsdigest::pipeline::{DEFAULT_ARTICLE_DELAY, DEFAULT_CATEGORY_DELAY, DEFAULT_INTERVAL};
use newsdigest::publish::DEFAULT_API_BASE;
use newsdigest::rate_limit::rate_limits;
use newsdigest::summarize::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use newsdigest::{Category, CrawlOptions, GroqOptions, PipelineOptions, TelegramOptions};
use serde::Deserialize;

pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/crawled_articles.db?mode=rwc";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub crawler: CrawlerConfig,
    pub groq: GroqConfig,
    pub telegram: TelegramConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SeaORM connection URL. Relative SQLite paths resolve against the
    /// working directory (`/app` in the container).
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub base_url: String,
    /// Listing pages per category.
    pub pages: u32,
    /// Article pages fetched in parallel.
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub requests_per_second: u32,
    /// Category slugs crawled by `run`, in order.
    pub categories: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            pages: 1,
            concurrency: 5,
            timeout_secs: 10,
            requests_per_second: rate_limits::CRAWLER_DEFAULT_RPS,
            categories: Category::TRENDING
                .iter()
                .map(|c| c.slug().to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GroqConfig {
    /// Can also be set via GROQ_API_KEY.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Completions requested per article before giving up on a short summary.
    pub max_attempts: u32,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 8192,
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Can also be set via TELEGRAM_BOT_TOKEN.
    pub bot_token: Option<String>,
    /// Can also be set via TELEGRAM_CHAT_ID.
    pub chat_id: Option<String>,
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
    pub article_delay_secs: u64,
    pub category_delay_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL.as_secs(),
            article_delay_secs: DEFAULT_ARTICLE_DELAY.as_secs(),
            category_delay_secs: DEFAULT_CATEGORY_DELAY.as_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for the newsdigest crates when RUST_LOG is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Default `EnvFilter` directive.
    pub fn filter_directive(&self) -> String {
        let level = self.level.trim();
        let level = if level.is_empty() { "info" } else { level };
        format!("newsdigest={level},newsdigest_cli={level}")
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/newsdigest/config.toml)
    /// 3. Local config file (./newsdigest.toml)
    /// 4. Environment variables with NEWSDIGEST_ prefix
    /// 5. The plain credential variables
    pub fn load() -> Self {
        let mut builder = Settings::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("newsdigest.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./newsdigest.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        Self::from_layers(builder, Self::env_layer(None), |name| {
            std::env::var(name).ok()
        })
    }

    /// `NEWSDIGEST_*` variables, read from the process environment unless
    /// `vars` is given.
    fn env_layer(vars: Option<Map<String, String>>) -> Environment {
        // NEWSDIGEST_DATABASE__URL -> database.url
        Environment::with_prefix("NEWSDIGEST")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("crawler.categories")
            .try_parsing(true)
            .source(vars)
    }

    fn from_layers(
        files: ConfigBuilder<DefaultState>,
        env: Environment,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut config = match files.add_source(env).build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        };

        config.apply_env_overrides(lookup);
        config
    }

    /// Apply the plain credential variables. Blank values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = get(GROQ_API_KEY) {
            self.groq.api_key = Some(key);
        }
        if let Some(token) = get(TELEGRAM_BOT_TOKEN) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat_id) = get(TELEGRAM_CHAT_ID) {
            self.telegram.chat_id = Some(chat_id);
        }
    }

    pub fn groq_api_key(&self) -> Option<&str> {
        non_blank(self.groq.api_key.as_deref())
    }

    pub fn telegram_bot_token(&self) -> Option<&str> {
        non_blank(self.telegram.bot_token.as_deref())
    }

    pub fn telegram_chat_id(&self) -> Option<&str> {
        non_blank(self.telegram.chat_id.as_deref())
    }

    /// Names of the credentials `run` needs that are not set.
    pub fn missing_credentials(&self, dry_run: bool) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.groq_api_key().is_none() {
            missing.push(GROQ_API_KEY);
        }
        if !dry_run {
            if self.telegram_bot_token().is_none() {
                missing.push(TELEGRAM_BOT_TOKEN);
            }
            if self.telegram_chat_id().is_none() {
                missing.push(TELEGRAM_CHAT_ID);
            }
        }
        missing
    }

    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            base_url: self.crawler.base_url.clone(),
            pages: self.crawler.pages.max(1),
            concurrency: self.crawler.concurrency.max(1),
            request_timeout: Duration::from_secs(self.crawler.timeout_secs.max(1)),
            requests_per_second: self.crawler.requests_per_second,
            ..CrawlOptions::default()
        }
    }

    pub fn groq_options(&self) -> GroqOptions {
        GroqOptions {
            endpoint: self.groq.endpoint.clone(),
            model: self.groq.model.clone(),
            temperature: self.groq.temperature,
            max_tokens: self.groq.max_tokens,
            max_attempts: self.groq.max_attempts.max(1),
            ..GroqOptions::default()
        }
    }

    pub fn telegram_options(&self) -> TelegramOptions {
        TelegramOptions {
            api_base: self.telegram.api_base.clone(),
            ..TelegramOptions::default()
        }
    }

    /// Pipeline options; non-empty `categories` replaces the configured list.
    pub fn pipeline_options(&self, categories: &[Category], dry_run: bool) -> PipelineOptions {
        let categories = if categories.is_empty() {
            self.crawler.categories.clone()
        } else {
            categories.iter().map(|c| c.slug().to_string()).collect()
        };

        PipelineOptions {
            categories,
            article_delay: Duration::from_secs(self.schedule.article_delay_secs),
            category_delay: Duration::from_secs(self.schedule.category_delay_secs),
            interval: Duration::from_secs(self.schedule.interval_secs),
            dry_run,
        }
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "newsdigest").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
