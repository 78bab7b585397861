//! VnExpress listing categories.
//!
//! A category is identified on the site by its URL slug (`tin-nong`,
//! `the-gioi`, ...). Articles keep the raw slug they were crawled under, so
//! lookups that operate on stored data take `&str` rather than [`Category`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Emoji used for slugs without a dedicated one.
pub const DEFAULT_EMOJI: &str = "📄";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    // Trending feeds
    MostViewed,
    Hot,
    Latest24h,
    // Sections
    News,
    Travel,
    World,
    Business,
    Science,
    Entertainment,
    Sports,
    Law,
    Education,
    Health,
    Life,
}

impl Category {
    /// Every known category, trending feeds first.
    pub const ALL: [Category; 14] = [
        Category::MostViewed,
        Category::Hot,
        Category::Latest24h,
        Category::News,
        Category::Travel,
        Category::World,
        Category::Business,
        Category::Science,
        Category::Entertainment,
        Category::Sports,
        Category::Law,
        Category::Education,
        Category::Health,
        Category::Life,
    ];

    /// The feeds crawled when no categories are configured.
    pub const TRENDING: [Category; 3] = [Category::MostViewed, Category::Hot, Category::Latest24h];

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Category::MostViewed => "tin-xem-nhieu",
            Category::Hot => "tin-nong",
            Category::Latest24h => "tin-tuc-24h",
            Category::News => "thoi-su",
            Category::Travel => "du-lich",
            Category::World => "the-gioi",
            Category::Business => "kinh-doanh",
            Category::Science => "khoa-hoc",
            Category::Entertainment => "giai-tri",
            Category::Sports => "the-thao",
            Category::Law => "phap-luat",
            Category::Education => "giao-duc",
            Category::Health => "suc-khoe",
            Category::Life => "doi-song",
        }
    }

    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            Category::MostViewed => "🏆",
            Category::Hot => "🔥",
            Category::Latest24h => "🕒",
            Category::News => "📰",
            Category::Travel => "✈️",
            Category::World => "🌍",
            Category::Business => "💼",
            Category::Science => "🔬",
            Category::Entertainment => "🎭",
            Category::Sports => "⚽",
            Category::Law => "⚖️",
            Category::Education => "📚",
            Category::Health => "🏥",
            Category::Life => "🌟",
        }
    }
}

/// Emoji for a stored category slug, falling back to [`DEFAULT_EMOJI`].
#[must_use]
pub fn emoji_for_slug(slug: &str) -> &'static str {
    slug.parse::<Category>()
        .map(Category::emoji)
        .unwrap_or(DEFAULT_EMOJI)
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.slug() == slug)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.slug().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
