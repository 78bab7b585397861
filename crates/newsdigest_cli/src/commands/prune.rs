use newsdigest::{ArticleStore, connect_and_migrate};

pub(crate) async fn handle_prune(
    database_url: &str,
    older_than_days: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = ArticleStore::new(connect_and_migrate(database_url).await?);

    let removed = store.delete_older_than(older_than_days).await?;
    let remaining = store.count().await?;

    tracing::info!(removed, remaining, older_than_days, "Pruned article records");
    println!("Removed {removed} articles older than {older_than_days} days ({remaining} left).");
    Ok(())
}
