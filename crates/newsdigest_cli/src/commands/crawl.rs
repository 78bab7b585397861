use console::style;
use newsdigest::db::{connect, sqlite_file_path};
use newsdigest::{ArticleStore, Category, NewsCrawler};

use crate::config::Config;

/// The article store, if the database already exists. `crawl` never creates
/// or migrates it; without a store every listed article counts as new.
async fn existing_store(
    database_url: &str,
) -> Result<Option<ArticleStore>, Box<dyn std::error::Error>> {
    if database_url.starts_with("sqlite:") {
        match sqlite_file_path(database_url) {
            Some(path) if path.exists() => {}
            _ => return Ok(None),
        }
    }
    Ok(Some(ArticleStore::new(connect(database_url).await?)))
}

pub(crate) async fn handle_crawl(
    config: &Config,
    database_url: &str,
    category: Category,
    pages: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = config.crawl_options();
    if let Some(pages) = pages {
        options.pages = pages.max(1);
    }
    let mut crawler = NewsCrawler::new(options)?;
    match existing_store(database_url).await? {
        Some(store) => crawler = crawler.with_store(store),
        None => tracing::debug!("No article database yet; listing every article"),
    }

    let articles = crawler.latest_articles(category.slug()).await;
    if articles.is_empty() {
        println!("No new articles in {}.", category);
        return Ok(());
    }

    for article in &articles {
        println!("{} {}", category.emoji(), style(&article.title).bold());
        println!("   {}", article.url);
    }
    println!();
    println!("{} new articles in {}", articles.len(), category);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_database_file_is_not_created() {
        let path = std::env::temp_dir().join(format!(
            "newsdigest-crawl-{}-missing.db",
            std::process::id()
        ));
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let store = existing_store(&url).await.expect("no connection attempted");
        assert!(store.is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn in_memory_database_is_skipped() {
        let store = existing_store("sqlite::memory:").await.unwrap();
        assert!(store.is_none());
    }
}
