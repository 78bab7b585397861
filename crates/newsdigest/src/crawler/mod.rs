//! VnExpress crawler.
//!
//! - [`listing`] - article links from `{category}-p{page}` listing pages
//! - [`article`] - title, lead and body text from article pages
//!
//! [`NewsCrawler`] ties both to an [`HttpTransport`] and, optionally, an
//! [`ArticleStore`] used to skip articles that were already posted.

pub mod article;
pub mod listing;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Local;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

use crate::entity::article::format_timestamp;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpError, HttpRequest, HttpTransport};
use crate::rate_limit::{ApiRateLimiter, rate_limits};
use crate::store::{ArticleStore, StoreError};

pub use article::{ArticleContent, parse_article};
pub use listing::parse_listing;

pub const DEFAULT_BASE_URL: &str = "https://vnexpress.net";

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("{url}: {source}")]
    Http {
        url: String,
        #[source]
        source: HttpError,
    },
    #[error("{url}: HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("{url}: body too large ({bytes} bytes)")]
    BodyTooLarge { url: String, bytes: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub base_url: String,
    /// Listing pages per category, starting at page 1.
    pub pages: u32,
    /// Article pages fetched in parallel.
    pub concurrency: usize,
    pub request_timeout: StdDuration,
    pub requests_per_second: u32,
    pub max_body_bytes: usize,
    pub user_agent: String,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            pages: 1,
            concurrency: 5,
            request_timeout: StdDuration::from_secs(10),
            requests_per_second: rate_limits::CRAWLER_DEFAULT_RPS,
            max_body_bytes: 4 * 1024 * 1024,
            user_agent: concat!("newsdigest/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// An extracted article ready for summarizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    /// Description and body text, see [`ArticleContent::summary_input`].
    pub content: String,
    pub url: String,
    /// Slug of the listing the article was found under.
    pub category: String,
    /// Extraction time, `%Y-%m-%d %H:%M:%S`.
    pub published_date: String,
}

impl Article {
    fn from_content(content: ArticleContent, url: &str, category: &str) -> Self {
        Self {
            content: content.summary_input(),
            title: content.title,
            url: url.to_string(),
            category: category.to_string(),
            published_date: format_timestamp(Local::now()),
        }
    }
}

/// Crawler for listing and article pages.
///
/// Cheap to clone: clones share the transport, store and rate limiter.
#[derive(Clone)]
pub struct NewsCrawler {
    transport: Arc<dyn HttpTransport>,
    store: Option<ArticleStore>,
    limiter: ApiRateLimiter,
    options: Arc<CrawlOptions>,
}

impl NewsCrawler {
    /// Build a crawler over a reqwest transport configured from `options`.
    pub fn new(options: CrawlOptions) -> Result<Self, CrawlError> {
        let transport = ReqwestTransport::with_timeout(options.request_timeout, &options.user_agent)
            .map_err(|source| CrawlError::Http {
                url: options.base_url.clone(),
                source,
            })?;
        Ok(Self::with_transport(Arc::new(transport), options))
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>, options: CrawlOptions) -> Self {
        Self {
            transport,
            store: None,
            limiter: ApiRateLimiter::new(options.requests_per_second),
            options: Arc::new(options),
        }
    }

    /// Skip URLs that are already recorded in `store`.
    #[must_use]
    pub fn with_store(mut self, store: ArticleStore) -> Self {
        self.store = Some(store);
        self
    }

    /// `{base_url}/{category}-p{page}`.
    pub fn listing_url(&self, category: &str, page: u32) -> Result<Url, CrawlError> {
        let raw = format!(
            "{}/{}-p{}",
            self.options.base_url.trim_end_matches('/'),
            category,
            page
        );
        Url::parse(&raw).map_err(|_| CrawlError::InvalidUrl(raw))
    }

    async fn fetch_html(&self, url: &str) -> Result<String, CrawlError> {
        self.limiter.wait().await;

        let request = HttpRequest::get(url).with_header("User-Agent", &self.options.user_agent);
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|source| CrawlError::Http {
                url: url.to_string(),
                source,
            })?;

        if !response.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        let declared = response
            .header("Content-Length")
            .and_then(|value| value.parse::<usize>().ok());
        let bytes = declared
            .unwrap_or(0)
            .max(response.body.len());
        if bytes > self.options.max_body_bytes {
            return Err(CrawlError::BodyTooLarge {
                url: url.to_string(),
                bytes,
            });
        }

        Ok(response.text())
    }

    /// Article URLs on one listing page that have not been recorded yet.
    pub async fn try_new_article_urls(
        &self,
        category: &str,
        page: u32,
    ) -> Result<Vec<String>, CrawlError> {
        let page_url = self.listing_url(category, page)?;
        let body = self.fetch_html(page_url.as_str()).await?;

        if !listing::has_listing_entries(&body) {
            tracing::info!(url = %page_url, "No news found");
            return Ok(Vec::new());
        }

        let mut urls = Vec::new();
        for url in parse_listing(&page_url, &body) {
            let crawled = match &self.store {
                Some(store) => store.is_crawled(&url).await?,
                None => false,
            };
            if !crawled {
                urls.push(url);
            }
        }

        tracing::debug!(url = %page_url, new = urls.len(), "Parsed listing");
        Ok(urls)
    }

    /// Like [`try_new_article_urls`](Self::try_new_article_urls), but logs
    /// failures and returns no URLs instead.
    pub async fn new_article_urls(&self, category: &str, page: u32) -> Vec<String> {
        match self.try_new_article_urls(category, page).await {
            Ok(urls) => urls,
            Err(err) => {
                tracing::error!(category, page, error = %err, "Error getting URLs");
                Vec::new()
            }
        }
    }

    /// Fetch and parse one article page. `Ok(None)` means the page is not an
    /// article.
    pub async fn extract(&self, url: &str) -> Result<Option<ArticleContent>, CrawlError> {
        let body = self.fetch_html(url).await?;
        Ok(parse_article(&body))
    }

    /// Extract an article and keep it only if it has text besides a title.
    /// Failures are logged and yield `None`.
    pub async fn process_article(&self, url: &str, category: &str) -> Option<Article> {
        match self.extract(url).await {
            Ok(Some(content)) if !content.title.is_empty() && content.has_text() => {
                Some(Article::from_content(content, url, category))
            }
            Ok(_) => {
                tracing::debug!(url, "Skipping page without article text");
                None
            }
            Err(err) => {
                tracing::error!(url, error = %err, "Error extracting content");
                None
            }
        }
    }

    /// New articles across the first `pages` listing pages of `category`, in
    /// listing order. Articles of a page are fetched concurrently.
    ///
    /// A URL listed on more than one page is only returned for the first.
    pub async fn latest_articles(&self, category: &str) -> Vec<Article> {
        let mut seen = HashSet::new();
        let mut articles = Vec::new();
        for page in 1..=self.options.pages.max(1) {
            let urls: Vec<String> = self
                .new_article_urls(category, page)
                .await
                .into_iter()
                .filter(|url| seen.insert(url.clone()))
                .collect();
            articles.extend(self.process_all(urls, category).await);
        }
        articles
    }

    async fn process_all(&self, urls: Vec<String>, category: &str) -> Vec<Article> {
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let mut join_set: JoinSet<(usize, Option<Article>)> = JoinSet::new();

        for (index, url) in urls.into_iter().enumerate() {
            let crawler = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let category = category.to_string();
            join_set.spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return (index, None);
                };
                (index, crawler.process_article(&url, &category).await)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(err) => tracing::error!(error = %err, "Article task failed"),
            }
        }

        results.sort_by_key(|(index, _)| *index);
        results
            .into_iter()
            .filter_map(|(_, article)| article)
            .collect()
    }
}
