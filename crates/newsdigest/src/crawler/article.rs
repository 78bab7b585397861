//! Article detail pages.

use std::fmt::Write as _;

use scraper::{ElementRef, Html, Selector};

/// Text extracted from an article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleContent {
    pub title: String,
    /// Lead paragraph; empty when the page has none.
    pub description: String,
    /// Body paragraphs in page order, blank ones dropped.
    pub paragraphs: Vec<String>,
}

impl ArticleContent {
    /// Body paragraphs joined by single spaces.
    #[must_use]
    pub fn body(&self) -> String {
        self.paragraphs.join(" ")
    }

    /// Whether there is any text besides the title.
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.description.is_empty() || !self.paragraphs.is_empty()
    }

    /// Summarizer input: the description, a newline, then the body.
    #[must_use]
    pub fn summary_input(&self) -> String {
        format!("{}\n{}", self.description, self.body())
    }

    /// Plain-text rendering with `Title:`, `Description:` and `Content:`
    /// sections. Empty sections are omitted.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "Title: {}\n\n", self.title);
        if !self.description.is_empty() {
            let _ = write!(out, "Description:\n{}\n\n", self.description);
        }
        if !self.paragraphs.is_empty() {
            out.push_str("Content:\n");
            for paragraph in &self.paragraphs {
                out.push_str(paragraph);
                out.push('\n');
            }
        }
        out
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extract an article from a detail page.
///
/// Returns `None` when the page has no `h1.title-detail`, which is how
/// listing pages, video pages and error pages look.
pub fn parse_article(body: &str) -> Option<ArticleContent> {
    let document = Html::parse_document(body);
    let title_selector = Selector::parse("h1.title-detail").ok()?;
    let description_selector = Selector::parse("p.description").ok()?;
    let paragraph_selector = Selector::parse("p.Normal").ok()?;

    let title = element_text(document.select(&title_selector).next()?);

    let description = document
        .select(&description_selector)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let paragraphs = document
        .select(&paragraph_selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect();

    Some(ArticleContent {
        title,
        description,
        paragraphs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <h1 class="title-detail">  Mưa lớn ở Hà Nội  </h1>
          <p class="description">Nhiều tuyến phố ngập sâu sau cơn mưa chiều.</p>
          <article>
            <p class="Normal">Đoạn một.</p>
            <p class="Normal">   </p>
            <p class="Normal">Đoạn <strong>hai</strong>.</p>
            <p class="author">Tác giả</p>
          </article>
        </body></html>
    "#;

    #[test]
    fn extracts_title_description_and_paragraphs() {
        let content = parse_article(PAGE).expect("article page");
        assert_eq!(content.title, "Mưa lớn ở Hà Nội");
        assert_eq!(
            content.description,
            "Nhiều tuyến phố ngập sâu sau cơn mưa chiều."
        );
        assert_eq!(content.paragraphs, vec!["Đoạn một.", "Đoạn hai."]);
        assert_eq!(content.body(), "Đoạn một. Đoạn hai.");
        assert_eq!(
            content.summary_input(),
            "Nhiều tuyến phố ngập sâu sau cơn mưa chiều.\nĐoạn một. Đoạn hai."
        );
    }

    #[test]
    fn page_without_title_is_not_an_article() {
        assert_eq!(
            parse_article(r#"<p class="Normal">orphan paragraph</p>"#),
            None
        );
    }

    #[test]
    fn missing_description_is_empty() {
        let content =
            parse_article(r#"<h1 class="title-detail">T</h1><p class="Normal">Body</p>"#).unwrap();
        assert_eq!(content.description, "");
        assert!(content.has_text());
        assert_eq!(content.summary_input(), "\nBody");
    }

    #[test]
    fn title_only_page_has_no_text() {
        let content = parse_article(r#"<h1 class="title-detail">T</h1>"#).unwrap();
        assert!(!content.has_text());
    }

    #[test]
    fn render_text_omits_empty_sections() {
        let content = ArticleContent {
            title: "T".to_string(),
            description: String::new(),
            paragraphs: vec!["one".to_string(), "two".to_string()],
        };
        assert_eq!(content.render_text(), "Title: T\n\nContent:\none\ntwo\n");

        let full = parse_article(PAGE).unwrap();
        let text = full.render_text();
        assert!(text.starts_with("Title: Mưa lớn ở Hà Nội\n\nDescription:\n"));
        assert!(text.ends_with("Content:\nĐoạn một.\nĐoạn hai.\n"));
    }
}
