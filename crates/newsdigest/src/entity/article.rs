//! Article entity - one row per article that has been summarized and posted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Timestamp format used for the text date columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Article model.
///
/// Dates are stored as `%Y-%m-%d %H:%M:%S` text in local time, which sorts
/// lexicographically in chronological order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    /// Canonical article URL.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub url: String,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    /// Slug of the listing the article was found under.
    #[sea_orm(column_type = "Text")]
    pub category: String,
    /// When the article content was extracted.
    #[sea_orm(column_type = "Text")]
    pub published_date: String,
    /// When the row was written.
    #[sea_orm(column_type = "Text")]
    pub crawled_date: String,
    #[sea_orm(column_type = "Text")]
    pub summary: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Format a timestamp for storage.
#[must_use]
pub fn format_timestamp(at: chrono::DateTime<chrono::Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
