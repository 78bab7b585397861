use std::sync::Arc;

use newsdigest::{
    ArticleStore, Category, GroqSummarizer, NewsCrawler, Pipeline, TelegramPublisher,
    connect_and_migrate,
};

use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::shutdown::setup_shutdown_handler;

pub(crate) async fn handle_run(
    config: &Config,
    database_url: &str,
    once: bool,
    dry_run: bool,
    categories: &[Category],
) -> Result<(), Box<dyn std::error::Error>> {
    let missing = config.missing_credentials(dry_run);
    if !missing.is_empty() {
        eprintln!(
            "Missing required environment variables: {}",
            missing.join(", ")
        );
        eprintln!("Please add them to your .env file");
        std::process::exit(1);
    }

    let db = connect_and_migrate(database_url).await?;
    let store = ArticleStore::new(db);

    let crawler = NewsCrawler::new(config.crawl_options())?.with_store(store.clone());
    let summarizer = GroqSummarizer::new(
        config.groq_api_key().unwrap_or_default(),
        config.groq_options(),
    )?;

    let mut pipeline = Pipeline::new(
        crawler,
        Arc::new(summarizer),
        store,
        config.pipeline_options(categories, dry_run),
    );
    if !dry_run {
        let publisher = TelegramPublisher::new(
            config.telegram_bot_token().unwrap_or_default(),
            config.telegram_chat_id().unwrap_or_default(),
            config.telegram_options(),
        )?;
        pipeline = pipeline.with_publisher(Arc::new(publisher));
    }

    let shutdown = setup_shutdown_handler();
    let reporter = Arc::new(ProgressReporter::new(config.logging.json));
    let callback = reporter.as_callback();

    if once {
        let report = pipeline.run_cycle(&shutdown, Some(&callback)).await;
        reporter.finish();
        println!(
            "{} categories, {} crawled, {} summarized, {} published, {} failed",
            report.categories, report.crawled, report.summarized, report.published, report.failed
        );
    } else {
        pipeline.run_forever(&shutdown, Some(&callback)).await;
        reporter.finish();
    }

    Ok(())
}
