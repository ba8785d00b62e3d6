//! Heuristic content-health score
//!
//! The score rewards length, short sentences and structure. Thresholds are
//! fixed; they are a heuristic, not a readability formula.

use crate::visible_text;
use regex_lite::Regex;
use std::sync::OnceLock;

/// Highest possible score
pub const MAX_HEALTH: u8 = 100;

const BASE_SCORE: u32 = 40;
const LENGTH_THRESHOLD: usize = 100;
const LENGTH_BONUS: u32 = 20;
const LONG_FORM_THRESHOLD: usize = 300;
const LONG_FORM_BONUS: u32 = 10;
const MAX_AVG_SENTENCE_WORDS: f64 = 25.0;
const SENTENCE_BONUS: u32 = 10;
const HEADING_BONUS: u32 = 10;
const LIST_BONUS: u32 = 5;
const CODE_BONUS: u32 = 5;

fn sentence_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+").expect("valid sentence pattern"))
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<h[1-3](?:\s[^>]*)?>").expect("valid heading pattern"))
}

fn list_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<(?:ul|ol)(?:\s[^>]*)?>").expect("valid list pattern"))
}

fn code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<(?:code|pre)(?:\s[^>]*)?>").expect("valid code pattern"))
}

/// Score rich markup in [0, 100]
pub fn content_health(content: &str) -> u8 {
    let text = visible_text(content);
    if text.is_empty() {
        return 0;
    }

    let mut score = text_score(&text);
    if heading_re().is_match(content) {
        score += HEADING_BONUS;
    }
    if list_re().is_match(content) {
        score += LIST_BONUS;
    }
    if code_re().is_match(content) {
        score += CODE_BONUS;
    }
    clamp(score)
}

/// Score plain text; it carries no structural markup
pub fn plain_text_health(text: &str) -> u8 {
    if text.trim().is_empty() {
        return 0;
    }
    clamp(text_score(text))
}

/// Base, length and sentence-length components
fn text_score(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    let mut score = BASE_SCORE;

    if words >= LENGTH_THRESHOLD {
        score += LENGTH_BONUS;
    }
    if words >= LONG_FORM_THRESHOLD {
        score += LONG_FORM_BONUS;
    }

    let sentences = sentence_end_re().find_iter(text).count().max(1);
    if (words as f64 / sentences as f64) < MAX_AVG_SENTENCE_WORDS {
        score += SENTENCE_BONUS;
    }
    score
}

fn clamp(score: u32) -> u8 {
    score.min(u32::from(MAX_HEALTH)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(count: usize, words_each: usize) -> String {
        let sentence = vec!["word"; words_each].join(" ");
        vec![format!("{sentence}."); count].join(" ")
    }

    #[test]
    fn test_empty_content_scores_zero() {
        assert_eq!(content_health(""), 0);
        assert_eq!(content_health("<p>   </p>"), 0);
        assert_eq!(content_health("<p><br></p><ul><li></li></ul>"), 0);
    }

    #[test]
    fn test_short_text_with_short_sentences() {
        assert_eq!(content_health("<p>Short and sweet.</p>"), 50);
    }

    #[test]
    fn test_long_run_on_sentence_gets_no_sentence_bonus() {
        let body = vec!["word"; 120].join(" ");
        assert_eq!(content_health(&format!("<p>{body}</p>")), 60);
    }

    #[test]
    fn test_length_bonuses_are_additive() {
        let body = sentences(70, 5);
        assert_eq!(content_health(&format!("<p>{body}</p>")), 80);
    }

    #[test]
    fn test_heading_350_words_scores_at_least_90() {
        let body = sentences(70, 5);
        let score = content_health(&format!("<h1>Title</h1><p>{body}</p>"));
        assert!(score >= 90);
        assert_eq!(score, 90);
    }

    #[test]
    fn test_h4_is_not_a_heading_bonus() {
        assert_eq!(content_health("<h4>Small.</h4>"), 50);
        assert_eq!(content_health("<H2 class=\"t\">Big.</H2>"), 60);
    }

    #[test]
    fn test_clamped_to_max() {
        let body = sentences(70, 5);
        let markup = format!("<h2>T</h2><p>{body}</p><ol><li>x</li></ol><pre><code>y</code></pre>");
        assert_eq!(content_health(&markup), MAX_HEALTH);
    }

    #[test]
    fn test_list_and_code_bonuses() {
        assert_eq!(content_health("<ul><li>One.</li></ul>"), 55);
        assert_eq!(content_health("<p>Run <code>x</code>.</p>"), 55);
    }

    #[test]
    fn test_inline_formatting_inside_words_keeps_sentence_bonus() {
        let body = vec!["w<b>o</b>rd"; 20].join(" ");
        assert_eq!(content_health(&format!("<p>{body}.</p>")), 50);
    }

    #[test]
    fn test_punctuation_runs_count_once() {
        let body = vec!["word"; 30].join(" ");
        assert_eq!(content_health(&format!("<p>{body}?!...</p>")), 40);
    }

    #[test]
    fn test_plain_text_ignores_tag_lookalikes() {
        assert_eq!(plain_text_health("<h1>not a heading.</h1>"), 50);
        assert_eq!(plain_text_health("  "), 0);
    }
}
