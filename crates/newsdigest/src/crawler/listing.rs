//! Category listing pages.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

/// Article links on a listing page, in page order without duplicates.
///
/// Each element with class `title-news` contributes the `href` of its first
/// `<a>` descendant. Relative links are resolved against `page_url`; entries
/// without a usable link are skipped.
pub fn parse_listing(page_url: &Url, body: &str) -> Vec<String> {
    let document = Html::parse_document(body);
    let (Ok(title_selector), Ok(anchor_selector)) =
        (Selector::parse(".title-news"), Selector::parse("a"))
    else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for title in document.select(&title_selector) {
        let Some(anchor) = title.select(&anchor_selector).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            continue;
        }
        let Ok(resolved) = page_url.join(href) else {
            continue;
        };
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }

        let url = resolved.to_string();
        if seen.insert(url.clone()) {
            urls.push(url);
        }
    }

    urls
}

/// Whether the page has any `title-news` element at all.
pub(crate) fn has_listing_entries(body: &str) -> bool {
    let document = Html::parse_document(body);
    Selector::parse(".title-news")
        .map(|selector| document.select(&selector).next().is_some())
        .unwrap_or(false)
}
