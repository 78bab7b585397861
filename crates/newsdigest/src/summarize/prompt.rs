/// A summary must split into at least this many parts on `.`.
pub const MIN_SENTENCE_PARTS: usize = 4;

/// Summarization prompt for a Vietnamese news article.
#[must_use]
pub fn build_prompt(text: &str) -> String {
    format!(
        "Hãy tóm tắt bài báo tiếng Việt sau đây, giữ nguyên các thông tin và ý chính quan trọng:\n\
         \n\
         {text}\n\
         \n\
         Yêu cầu khi tóm tắt:\n\
         - Độ dài: 4-10 câu\n\
         - Giữ nguyên các thông tin quan trọng như: thời gian, địa điểm, nhân vật chính\n\
         - Sắp xếp các sự kiện theo trình tự thời gian\n\
         - Sử dụng ngôn ngữ tự nhiên, dễ hiểu\n\
         - Không thêm thông tin không có trong bài gốc\n\
         - Chỉ trả lời bằng tiếng Việt\n"
    )
}

/// Whether `summary` is long enough to post.
///
/// Counts the pieces produced by splitting on `.`, so "A. B. C." (four
/// pieces, the last one empty) passes while "A. B." does not.
#[must_use]
pub fn is_long_enough(summary: &str) -> bool {
    summary.split('.').count() >= MIN_SENTENCE_PARTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_article_and_requirements() {
        let prompt = build_prompt("Nội dung bài báo");
        assert!(prompt.starts_with("Hãy tóm tắt bài báo tiếng Việt"));
        assert!(prompt.contains("\n\nNội dung bài báo\n\n"));
        assert!(prompt.contains("- Độ dài: 4-10 câu"));
        assert!(prompt.ends_with("- Chỉ trả lời bằng tiếng Việt\n"));
    }

    #[test]
    fn length_check_counts_split_parts() {
        assert!(!is_long_enough("Một câu duy nhất"));
        assert!(!is_long_enough("Một. Hai."));
        assert!(is_long_enough("Một. Hai. Ba."));
        assert!(is_long_enough("Một. Hai. Ba. Bốn. Năm"));
    }
}
