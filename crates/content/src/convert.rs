//! Conversion between rich markup and plain text
//!
//! `rich_to_plain` is lossy: formatting, links, images and tables are
//! discarded. `plain_to_rich` followed by `rich_to_plain` returns simple text
//! unchanged.

use crate::{escape_html, unescape_html};
use doc_model::EMPTY_RICH_CONTENT;
use regex_lite::Regex;
use std::sync::OnceLock;

/// Opening/closing block tags and line-break markers
fn block_boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<br\s*/?>|</?(?:p|div|h[1-6]|li|tr|blockquote)(?:\s[^>]*)?>")
            .expect("valid block boundary pattern")
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"))
}

fn newline_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid newline pattern"))
}

fn paragraph_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{2,}").expect("valid paragraph pattern"))
}

fn closing_or_leading_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"</[A-Za-z][A-Za-z0-9]*\s*>|^\s*<[A-Za-z][^>]*>").expect("valid markup pattern")
    })
}

/// Remove every markup tag, leaving text and character references intact
pub fn strip_tags(markup: &str) -> String {
    tag_re().replace_all(markup, "").into_owned()
}

/// Strip tags for counting: block boundaries and line breaks become spaces so
/// adjacent blocks don't merge, inline tags vanish so split words stay whole
pub(crate) fn tags_to_word_breaks(markup: &str) -> String {
    let spaced = block_boundary_re().replace_all(markup, " ");
    tag_re().replace_all(&spaced, "").into_owned()
}

/// Convert rich markup to plain text
pub fn rich_to_plain(markup: &str) -> String {
    if markup.trim().is_empty() {
        return String::new();
    }

    let text = block_boundary_re().replace_all(markup, "\n");
    let text = tag_re().replace_all(&text, "");
    let text = unescape_html(&text);
    let text = newline_run_re().replace_all(&text, "\n\n");

    let lines: Vec<&str> = text.split('\n').map(str::trim_end).collect();
    lines.join("\n").trim().to_string()
}

/// Convert plain text to rich markup, one paragraph per blank-line-separated block
pub fn plain_to_rich(text: &str) -> String {
    if text.is_empty() {
        return EMPTY_RICH_CONTENT.to_string();
    }

    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let escaped = escape_html(&normalized);

    paragraph_break_re()
        .split(&escaped)
        .map(|para| {
            if para.is_empty() {
                "<p><br></p>".to_string()
            } else {
                format!("<p>{}</p>", para.replace('\n', "<br>"))
            }
        })
        .collect()
}

/// Whether content appears to be markup rather than plain text.
///
/// True when it contains a closing tag or starts with a tag.
pub fn looks_like_markup(content: &str) -> bool {
    closing_or_leading_tag_re().is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rich_to_plain_empty() {
        assert_eq!(rich_to_plain(""), "");
        assert_eq!(rich_to_plain("   \n\t"), "");
        assert_eq!(rich_to_plain("<p></p>"), "");
        assert_eq!(rich_to_plain("<p><br></p>"), "");
    }

    #[test]
    fn test_rich_to_plain_paragraphs() {
        assert_eq!(rich_to_plain("<p>First</p><p>Second</p>"), "First\n\nSecond");
    }

    #[test]
    fn test_rich_to_plain_line_breaks() {
        assert_eq!(rich_to_plain("<p>one<br>two<br/>three<BR /></p>"), "one\ntwo\nthree");
    }

    #[test]
    fn test_rich_to_plain_headings_and_lists() {
        let markup = "<h1>Title</h1><ul><li>alpha</li><li>beta</li></ul><blockquote>quote</blockquote>";
        assert_eq!(rich_to_plain(markup), "Title\n\nalpha\n\nbeta\n\nquote");
    }

    #[test]
    fn test_rich_to_plain_strips_inline_formatting() {
        assert_eq!(
            rich_to_plain(r#"<p><strong>Bold</strong> and <a href="https://x.y">link</a></p>"#),
            "Bold and link"
        );
    }

    #[test]
    fn test_rich_to_plain_block_tags_with_attributes() {
        assert_eq!(
            rich_to_plain(r#"<div class="a">x</div><p style="color:red">y</p>"#),
            "x\n\ny"
        );
    }

    #[test]
    fn test_rich_to_plain_does_not_treat_pre_as_paragraph() {
        assert_eq!(rich_to_plain("<p>a <pre>b</pre> c</p>"), "a b c");
    }

    #[test]
    fn test_rich_to_plain_decodes_entities() {
        assert_eq!(
            rich_to_plain("<p>Tom &amp; Jerry&nbsp;&lt;3 &quot;x&quot; &#39;y&apos;</p>"),
            "Tom & Jerry <3 \"x\" 'y'"
        );
    }

    #[test]
    fn test_rich_to_plain_collapses_gaps_and_trailing_space() {
        let markup = "<div><p>a   </p></div><p></p><p></p><p>b</p>";
        assert_eq!(rich_to_plain(markup), "a\n\nb");
    }

    #[test]
    fn test_plain_to_rich_empty() {
        assert_eq!(plain_to_rich(""), "<p></p>");
    }

    #[test]
    fn test_plain_to_rich_paragraphs_and_breaks() {
        assert_eq!(
            plain_to_rich("line one\nline two\n\nnext"),
            "<p>line one<br>line two</p><p>next</p>"
        );
    }

    #[test]
    fn test_plain_to_rich_escapes() {
        assert_eq!(plain_to_rich("a < b & c"), "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_plain_to_rich_blank_only() {
        assert_eq!(plain_to_rich("\n\n"), "<p><br></p><p><br></p>");
    }

    #[test]
    fn test_plain_to_rich_normalizes_crlf() {
        assert_eq!(plain_to_rich("a\r\nb\r\n\r\nc"), "<p>a<br>b</p><p>c</p>");
    }

    #[test]
    fn test_special_characters_survive_both_directions() {
        let text = "x < y && \"q\" 'r'";
        assert_eq!(rich_to_plain(&plain_to_rich(text)), text);
    }

    #[test]
    fn test_looks_like_markup() {
        assert!(looks_like_markup("<p>hello</p>"));
        assert!(looks_like_markup("  <div>"));
        assert!(looks_like_markup("text then </b> closing"));
        assert!(!looks_like_markup("plain text"));
        assert!(!looks_like_markup("a < b and c > d"));
        assert!(!looks_like_markup("1 <2"));
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>a<b>b</b></p>"), "ab");
    }
}
