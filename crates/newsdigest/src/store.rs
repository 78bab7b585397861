//! Article store: dedup lookups and bookkeeping for posted articles.

use std::sync::Arc;

use chrono::{Duration, Local};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use thiserror::Error;

use crate::crawler::Article;
use crate::entity::article::{ActiveModel, Column, Entity as ArticleEntity, Model, format_timestamp};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Handle over the `articles` table.
///
/// Cheap to clone; clones share one connection.
#[derive(Clone, Debug)]
pub struct ArticleStore {
    db: Arc<DatabaseConnection>,
}

impl ArticleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Whether an article with this URL has already been recorded.
    pub async fn is_crawled(&self, url: &str) -> Result<bool> {
        let found = ArticleEntity::find_by_id(url.to_string())
            .select_only()
            .column(Column::Url)
            .into_tuple::<String>()
            .one(self.db.as_ref())
            .await?;
        Ok(found.is_some())
    }

    /// Insert or replace the row for `article.url`, stamping `crawled_date`
    /// with the current time.
    pub async fn record(&self, article: &Article, summary: &str) -> Result<()> {
        let model = ActiveModel {
            url: Set(article.url.clone()),
            title: Set(article.title.clone()),
            category: Set(article.category.clone()),
            published_date: Set(article.published_date.clone()),
            crawled_date: Set(format_timestamp(Local::now())),
            summary: Set(summary.to_string()),
        };

        ArticleEntity::insert(model)
            .on_conflict(
                OnConflict::column(Column::Url)
                    .update_columns([
                        Column::Title,
                        Column::Category,
                        Column::PublishedDate,
                        Column::CrawledDate,
                        Column::Summary,
                    ])
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await?;

        tracing::debug!(url = %article.url, "Recorded article");
        Ok(())
    }

    pub async fn find_by_url(&self, url: &str) -> Result<Option<Model>> {
        Ok(ArticleEntity::find_by_id(url.to_string())
            .one(self.db.as_ref())
            .await?)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(ArticleEntity::find().count(self.db.as_ref()).await?)
    }

    /// Number of stored articles per category slug, sorted by slug.
    pub async fn count_by_category(&self) -> Result<Vec<(String, i64)>> {
        let rows = ArticleEntity::find()
            .select_only()
            .column(Column::Category)
            .column_as(Expr::col(Column::Url).count(), "count")
            .group_by(Column::Category)
            .order_by_asc(Column::Category)
            .into_tuple::<(String, i64)>()
            .all(self.db.as_ref())
            .await?;
        Ok(rows)
    }

    /// Most recently recorded articles, newest first.
    pub async fn recent(&self, limit: u64, category: Option<&str>) -> Result<Vec<Model>> {
        let mut query = ArticleEntity::find();
        if let Some(category) = category {
            query = query.filter(Column::Category.eq(category));
        }
        Ok(query
            .order_by_desc(Column::CrawledDate)
            .order_by_asc(Column::Url)
            .limit(limit)
            .all(self.db.as_ref())
            .await?)
    }

    /// Delete rows recorded more than `days` days ago. Returns the number of
    /// rows removed.
    pub async fn delete_older_than(&self, days: u32) -> Result<u64> {
        let cutoff = format_timestamp(Local::now() - Duration::days(i64::from(days)));
        let result = ArticleEntity::delete_many()
            .filter(Column::CrawledDate.lt(cutoff))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn row(url: &str) -> Model {
        Model {
            url: url.to_string(),
            title: "Tiêu đề".to_string(),
            category: "tin-nong".to_string(),
            published_date: "2025-01-01 08:00:00".to_string(),
            crawled_date: "2025-01-01 08:05:00".to_string(),
            summary: "Một. Hai. Ba.".to_string(),
        }
    }

    #[tokio::test]
    async fn clones_share_one_mock_connection() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![row("https://vnexpress.net/a.html")], vec![]])
            .into_connection();
        let store = ArticleStore::new(db);
        let clone = store.clone();

        let found = clone
            .find_by_url("https://vnexpress.net/a.html")
            .await
            .expect("mock query should succeed");
        assert_eq!(found.map(|m| m.category), Some("tin-nong".to_string()));

        let missing = store
            .find_by_url("https://vnexpress.net/b.html")
            .await
            .expect("mock query should succeed");
        assert!(missing.is_none());
    }
}
