use crate::category::emoji_for_slug;
use crate::crawler::Article;

/// Escape characters that start an entity in Telegram's legacy Markdown.
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Telegram message for a summarized article.
#[must_use]
pub fn format_message(article: &Article, summary: &str) -> String {
    format!(
        "{emoji} *{title}*\n\n\
         📝 *Tóm tắt:*\n{summary}\n\n\
         🔗 [Đọc thêm]({url})\n\
         📂 Chuyên mục: {category}\n\
         🕒 {published}",
        emoji = emoji_for_slug(&article.category),
        title = escape_markdown(&article.title),
        summary = escape_markdown(summary),
        url = article.url,
        category = escape_markdown(&article.category),
        published = article.published_date,
    )
}
