//! Word, character and reading-time statistics

use crate::{content_health, plain_text_health, rich_to_plain, tags_to_word_breaks, unescape_html};
use doc_model::{ContentMode, Document};
use serde::{Deserialize, Serialize};

/// Average adult silent-reading speed in words per minute
pub const WORDS_PER_MINUTE: usize = 238;

/// Tag-stripped, entity-decoded text with whitespace runs collapsed
pub fn visible_text(content: &str) -> String {
    let stripped = tags_to_word_breaks(content);
    collapse_whitespace(&unescape_html(&stripped))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of whitespace-separated words in the visible text
pub fn word_count(content: &str) -> usize {
    visible_text(content).split_whitespace().count()
}

/// Number of characters in the visible text (not raw markup length)
pub fn char_count(content: &str) -> usize {
    visible_text(content).chars().count()
}

/// Minutes needed to read `word_count` words, rounded up.
///
/// Zero words take zero minutes; display policy is up to the caller.
pub fn reading_time(word_count: usize) -> usize {
    word_count.div_ceil(WORDS_PER_MINUTE)
}

/// Derived statistics for a piece of content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub words: usize,
    pub characters: usize,
    pub reading_minutes: usize,
    pub health: u8,
}

impl DocumentStats {
    /// Compute statistics for rich markup
    pub fn compute(content: &str) -> Self {
        let text = visible_text(content);
        Self::from_text(&text, content_health(content))
    }

    /// Compute statistics for plain text, which is measured as-is
    pub fn compute_plain(text: &str) -> Self {
        let text = collapse_whitespace(text);
        Self::from_text(&text, plain_text_health(&text))
    }

    /// Compute statistics for content in the given mode.
    ///
    /// Plain-text content that still holds markup is measured after conversion.
    pub fn compute_for_mode(content: &str, mode: ContentMode) -> Self {
        match mode {
            ContentMode::Rich => Self::compute(content),
            ContentMode::PlainText if crate::looks_like_markup(content) => {
                Self::compute_plain(&rich_to_plain(content))
            }
            ContentMode::PlainText => Self::compute_plain(content),
        }
    }

    /// Compute statistics for a stored document
    pub fn for_document(document: &Document) -> Self {
        if document.is_folder() {
            return Self::default();
        }
        Self::compute_for_mode(document.content(), document.mode())
    }

    fn from_text(text: &str, health: u8) -> Self {
        let words = text.split_whitespace().count();
        Self {
            words,
            characters: text.chars().count(),
            reading_minutes: reading_time(words),
            health,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{DocumentId, DocumentPatch};

    #[test]
    fn test_word_count_plain() {
        assert_eq!(word_count("Hello world"), 2);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
    }

    #[test]
    fn test_word_count_ignores_markup() {
        assert_eq!(word_count("<p>Hello</p><p>brave   new</p><p>world</p>"), 4);
        assert_eq!(word_count(r#"<img src="a.png">"#), 0);
    }

    #[test]
    fn test_char_count_uses_visible_text() {
        assert_eq!(char_count("Hello world"), 11);
        assert_eq!(char_count("<p><strong>Hello</strong>   world</p>"), 11);
        assert_eq!(char_count("<p>Tom &amp; Jerry</p>"), 11);
    }

    #[test]
    fn test_inline_tags_inside_words_do_not_split_them() {
        assert_eq!(word_count("<p>Hel<strong>lo</strong></p>"), 1);
        assert_eq!(char_count("<p>Hel<strong>lo</strong></p>"), 5);

        let content = "<p>Hel<strong>lo</strong> wor<em>ld</em></p>";
        assert_eq!(word_count(content), 2);
        assert_eq!(char_count(content), 11);
    }

    #[test]
    fn test_line_breaks_and_blocks_still_separate_words() {
        assert_eq!(word_count("<p>one<br>two</p><li>three</li><h2>four</h2>"), 4);
    }

    #[test]
    fn test_char_count_counts_characters_not_bytes() {
        assert_eq!(char_count("héllo wörld"), 11);
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(0), 0);
        assert_eq!(reading_time(1), 1);
        assert_eq!(reading_time(238), 1);
        assert_eq!(reading_time(239), 2);
        assert_eq!(reading_time(1000), 5);
    }

    #[test]
    fn test_stats_for_plain_text() {
        let stats = DocumentStats::compute_plain("Hello world");
        assert_eq!(stats.words, 2);
        assert_eq!(stats.characters, 11);
        assert_eq!(stats.reading_minutes, 1);
        assert_eq!(stats.health, 50);
    }

    #[test]
    fn test_plain_text_angle_brackets_are_not_tags() {
        let stats = DocumentStats::compute_plain("if a<b and c>d then");
        assert_eq!(stats.words, 5);
    }

    #[test]
    fn test_stats_for_document_uses_mode() {
        let mut doc = Document::new(DocumentId::new(), None, false);
        doc.apply(DocumentPatch::new().title("notes.txt").content("<p>Hello</p><p>world</p>"));
        let stats = DocumentStats::for_document(&doc);
        assert_eq!(stats.words, 2);
        assert_eq!(stats.characters, 11);
    }

    #[test]
    fn test_stats_for_folder_are_empty() {
        let folder = Document::new(DocumentId::new(), None, true);
        assert_eq!(DocumentStats::for_document(&folder), DocumentStats::default());
    }
}
