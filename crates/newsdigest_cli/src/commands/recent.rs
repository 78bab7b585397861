use console::style;
use newsdigest::ArticleModel;
use newsdigest::category::emoji_for_slug;
use newsdigest::{ArticleStore, connect_and_migrate};

fn render(article: &ArticleModel) -> String {
    format!(
        "{} {} {}\n   {}\n   {}",
        style(&article.crawled_date).dim(),
        emoji_for_slug(&article.category),
        style(&article.title).bold(),
        article.url,
        style(&article.category).cyan(),
    )
}

pub(crate) async fn handle_recent(
    database_url: &str,
    limit: u64,
    category: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = ArticleStore::new(connect_and_migrate(database_url).await?);

    let articles = store.recent(limit, category).await?;
    if articles.is_empty() {
        println!("No articles recorded yet.");
        return Ok(());
    }

    for article in &articles {
        println!("{}", render(article));
    }

    let counts = store.count_by_category().await?;
    let total: i64 = counts.iter().map(|(_, n)| n).sum();
    let breakdown: Vec<String> = counts
        .iter()
        .map(|(slug, n)| format!("{slug}: {n}"))
        .collect();
    println!();
    println!("{total} articles recorded ({})", breakdown.join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_title_url_and_emoji() {
        console::set_colors_enabled(false);
        let article = ArticleModel {
            url: "https://vnexpress.net/a.html".to_string(),
            title: "Tiêu đề".to_string(),
            category: "the-thao".to_string(),
            published_date: "2024-11-05 08:00:00".to_string(),
            crawled_date: "2024-11-05 08:01:00".to_string(),
            summary: "Một. Hai. Ba. Bốn.".to_string(),
        };

        let text = render(&article);
        assert!(text.starts_with("2024-11-05 08:01:00 ⚽ Tiêu đề"));
        assert!(text.contains("https://vnexpress.net/a.html"));
    }
}
