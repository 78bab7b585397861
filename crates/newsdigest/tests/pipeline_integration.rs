//! Integration tests for the processing cycle.
//!
//! Pages are served from an in-memory transport; the summarizer and publisher
//! are fakes that record their calls. Articles are recorded in an in-memory
//! SQLite database.

#![cfg(all(feature = "sqlite", feature = "migrate"))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use newsdigest::http::{HttpError, HttpRequest, HttpResponse, HttpTransport};
use newsdigest::pipeline::{PipelineProgress, ProgressCallback, Stage};
use newsdigest::{
    Article, ArticleStore, CrawlOptions, CycleReport, NewsCrawler, Pipeline, PipelineOptions,
    PublishError, Publisher, SummarizeError, Summarizer, connect_and_migrate, shutdown_channel,
};

const BASE: &str = "https://vnexpress.test";

#[derive(Default)]
struct StaticSite {
    pages: Mutex<HashMap<String, String>>,
}

impl StaticSite {
    fn page(&self, url: &str, body: String) {
        self.pages.lock().unwrap().insert(url.to_string(), body);
    }
}

#[async_trait]
impl HttpTransport for StaticSite {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let body = self.pages.lock().unwrap().get(&request.url).cloned();
        Ok(match body {
            Some(body) => HttpResponse {
                status: 200,
                headers: vec![("Content-Type".to_string(), "text/html".to_string())],
                body: body.into_bytes(),
            },
            None => HttpResponse {
                status: 404,
                headers: Vec::new(),
                body: Vec::new(),
            },
        })
    }
}

/// Summaries are derived from the input; input containing `FAIL` errors.
#[derive(Default)]
struct FakeSummarizer {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        self.calls.lock().unwrap().push(text.to_string());
        if text.contains("FAIL") {
            return Err(SummarizeError::EmptyResponse);
        }
        Ok("Một. Hai. Ba. Bốn.".to_string())
    }
}

/// Records published URLs; URLs containing `reject` fail.
#[derive(Default)]
struct FakePublisher {
    published: Mutex<Vec<String>>,
}

#[async_trait]
impl Publisher for FakePublisher {
    async fn publish(&self, article: &Article, _summary: &str) -> Result<(), PublishError> {
        if article.url.contains("reject") {
            return Err(PublishError::Api {
                status: 400,
                description: "Bad Request: can't parse entities".to_string(),
            });
        }
        self.published.lock().unwrap().push(article.url.clone());
        Ok(())
    }
}

fn listing(slugs: &[&str]) -> String {
    let items: String = slugs
        .iter()
        .map(|slug| format!(r#"<h3 class="title-news"><a href="/{slug}.html">{slug}</a></h3>"#))
        .collect();
    format!("<html><body>{items}</body></html>")
}

fn article_page(title: &str, body: &str) -> String {
    format!(
        r#"<html><body><h1 class="title-detail">{title}</h1>
           <p class="description">Lead</p><p class="Normal">{body}</p></body></html>"#
    )
}

struct Harness {
    site: Arc<StaticSite>,
    summarizer: Arc<FakeSummarizer>,
    publisher: Arc<FakePublisher>,
    store: ArticleStore,
}

impl Harness {
    async fn new() -> Self {
        let db = connect_and_migrate("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Self {
            site: Arc::new(StaticSite::default()),
            summarizer: Arc::new(FakeSummarizer::default()),
            publisher: Arc::new(FakePublisher::default()),
            store: ArticleStore::new(db),
        }
    }

    fn options(categories: &[&str], dry_run: bool) -> PipelineOptions {
        PipelineOptions {
            categories: categories.iter().map(|c| c.to_string()).collect(),
            article_delay: Duration::ZERO,
            category_delay: Duration::ZERO,
            interval: Duration::from_secs(3600),
            dry_run,
        }
    }

    fn pipeline(&self, options: PipelineOptions) -> Pipeline {
        self.pipeline_over_pages(options, 1)
    }

    fn pipeline_over_pages(&self, options: PipelineOptions, pages: u32) -> Pipeline {
        let crawl_options = CrawlOptions {
            base_url: BASE.to_string(),
            pages,
            requests_per_second: 1000,
            ..CrawlOptions::default()
        };
        let crawler = NewsCrawler::with_transport(self.site.clone(), crawl_options)
            .with_store(self.store.clone());
        Pipeline::new(crawler, self.summarizer.clone(), self.store.clone(), options)
            .with_publisher(self.publisher.clone())
    }

    fn published(&self) -> Vec<String> {
        self.publisher.published.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn test_cycle_publishes_then_records() {
    let harness = Harness::new().await;
    harness.site.page(
        &format!("{BASE}/tin-nong-p1"),
        listing(&["a-1", "a-2"]),
    );
    harness
        .site
        .page(&format!("{BASE}/a-1.html"), article_page("A1", "Body one"));
    harness
        .site
        .page(&format!("{BASE}/a-2.html"), article_page("A2", "Body two"));

    let pipeline = harness.pipeline(Harness::options(&["tin-nong"], false));
    let (_tx, shutdown) = shutdown_channel();
    let report = pipeline.run_cycle(&shutdown, None).await;

    assert_eq!(
        report,
        CycleReport {
            categories: 1,
            crawled: 2,
            summarized: 2,
            published: 2,
            stored: 2,
            failed: 0,
        }
    );
    assert_eq!(
        harness.published(),
        vec![format!("{BASE}/a-1.html"), format!("{BASE}/a-2.html")]
    );

    let row = harness
        .store
        .find_by_url(&format!("{BASE}/a-1.html"))
        .await
        .unwrap()
        .expect("recorded");
    assert_eq!(row.category, "tin-nong");
    assert_eq!(row.summary, "Một. Hai. Ba. Bốn.");
    assert_eq!(
        harness.summarizer.calls.lock().unwrap()[0],
        "Lead\nBody one"
    );

    // Everything is recorded, so a second cycle finds nothing new.
    let second = pipeline.run_cycle(&shutdown, None).await;
    assert_eq!(second.crawled, 0);
    assert_eq!(harness.published().len(), 2);
}

#[tokio::test]
async fn test_failures_are_counted_and_not_recorded() {
    let harness = Harness::new().await;
    harness.site.page(
        &format!("{BASE}/thoi-su-p1"),
        listing(&["bad-summary", "reject-me", "good"]),
    );
    harness.site.page(
        &format!("{BASE}/bad-summary.html"),
        article_page("Bad", "FAIL"),
    );
    harness
        .site
        .page(&format!("{BASE}/reject-me.html"), article_page("Reject", "ok"));
    harness
        .site
        .page(&format!("{BASE}/good.html"), article_page("Good", "ok"));

    let failures = Arc::new(Mutex::new(Vec::new()));
    let failures_capture = Arc::clone(&failures);
    let callback: ProgressCallback = Box::new(move |event| {
        if let PipelineProgress::ArticleFailed { url, stage, .. } = event {
            failures_capture.lock().unwrap().push((url, stage));
        }
    });

    let pipeline = harness.pipeline(Harness::options(&["thoi-su"], false));
    let (_tx, shutdown) = shutdown_channel();
    let report = pipeline.run_cycle(&shutdown, Some(&callback)).await;

    assert_eq!(report.crawled, 3);
    assert_eq!(report.summarized, 2);
    assert_eq!(report.published, 1);
    assert_eq!(report.stored, 1);
    assert_eq!(report.failed, 2);

    assert_eq!(
        *failures.lock().unwrap(),
        vec![
            (format!("{BASE}/bad-summary.html"), Stage::Summarize),
            (format!("{BASE}/reject-me.html"), Stage::Publish),
        ]
    );
    assert_eq!(harness.store.count().await.unwrap(), 1);
    assert!(
        !harness
            .store
            .is_crawled(&format!("{BASE}/reject-me.html"))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_dry_run_neither_publishes_nor_records() {
    let harness = Harness::new().await;
    harness
        .site
        .page(&format!("{BASE}/the-thao-p1"), listing(&["match"]));
    harness
        .site
        .page(&format!("{BASE}/match.html"), article_page("Match", "Goal"));

    let pipeline = harness.pipeline(Harness::options(&["the-thao"], true));
    assert!(pipeline.is_dry_run());

    let (_tx, shutdown) = shutdown_channel();
    let report = pipeline.run_cycle(&shutdown, None).await;

    assert_eq!(report.summarized, 1);
    assert_eq!(report.published, 0);
    assert_eq!(report.stored, 0);
    assert!(harness.published().is_empty());
    assert_eq!(harness.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_listing_does_not_abort_cycle() {
    let harness = Harness::new().await;
    harness
        .site
        .page(&format!("{BASE}/giao-duc-p1"), listing(&["school"]));
    harness
        .site
        .page(&format!("{BASE}/school.html"), article_page("School", "Class"));

    // `du-lich` has no listing page and answers 404.
    let pipeline = harness.pipeline(Harness::options(&["du-lich", "giao-duc"], false));
    let (_tx, shutdown) = shutdown_channel();
    let report = pipeline.run_cycle(&shutdown, None).await;

    assert_eq!(report.categories, 2);
    assert_eq!(report.published, 1);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn test_shutdown_before_cycle_skips_all_categories() {
    let harness = Harness::new().await;
    let pipeline = harness.pipeline(Harness::options(&["tin-nong", "thoi-su"], false));

    let (tx, shutdown) = shutdown_channel();
    tx.send(true).unwrap();
    let report = pipeline.run_cycle(&shutdown, None).await;

    assert_eq!(report, CycleReport::default());
    assert_eq!(pipeline.run_forever(&shutdown, None).await, 0);
}

#[tokio::test]
async fn test_run_forever_stops_when_shutdown_during_sleep() {
    let harness = Harness::new().await;
    harness
        .site
        .page(&format!("{BASE}/tin-nong-p1"), listing(&["only"]));
    harness
        .site
        .page(&format!("{BASE}/only.html"), article_page("Only", "Text"));

    let (tx, shutdown) = shutdown_channel();
    let tx = Arc::new(tx);
    let tx_capture = Arc::clone(&tx);
    let callback: ProgressCallback = Box::new(move |event| {
        if let PipelineProgress::Sleeping { secs } = event {
            assert_eq!(secs, 3600);
            let _ = tx_capture.send(true);
        }
    });

    let pipeline = harness.pipeline(Harness::options(&["tin-nong"], false));
    let cycles = tokio::time::timeout(
        Duration::from_secs(30),
        pipeline.run_forever(&shutdown, Some(&callback)),
    )
    .await
    .expect("shutdown interrupts the interval sleep");

    assert_eq!(cycles, 1);
    assert_eq!(harness.published().len(), 1);
}

#[tokio::test]
async fn test_article_on_two_listing_pages_is_published_once() {
    let harness = Harness::new().await;
    harness
        .site
        .page(&format!("{BASE}/tin-nong-p1"), listing(&["x"]));
    harness
        .site
        .page(&format!("{BASE}/tin-nong-p2"), listing(&["x", "y"]));
    harness
        .site
        .page(&format!("{BASE}/x.html"), article_page("X", "Body x"));
    harness
        .site
        .page(&format!("{BASE}/y.html"), article_page("Y", "Body y"));

    let pipeline = harness.pipeline_over_pages(Harness::options(&["tin-nong"], false), 2);
    let (_tx, shutdown) = shutdown_channel();
    let report = pipeline.run_cycle(&shutdown, None).await;

    assert_eq!(report.crawled, 2);
    assert_eq!(report.published, 2);
    assert_eq!(report.stored, 2);
    assert_eq!(
        harness.published(),
        vec![format!("{BASE}/x.html"), format!("{BASE}/y.html")]
    );
}
