//! Content mode detection from document titles
//!
//! The suffix after the final `.` of a title is the only signal for how a
//! document's content is encoded. `txt` selects plain text; anything else,
//! including no extension at all, selects rich markup.

use serde::{Deserialize, Serialize};

/// Extension that switches a document into plain-text mode
pub const PLAIN_TEXT_EXTENSION: &str = "txt";

/// Return the lowercase extension of a title, if it has a valid one.
///
/// The extension is the segment after the last `.` and must be non-empty and
/// purely ASCII alphanumeric; otherwise the title has no extension.
pub fn extension_of(title: &str) -> Option<String> {
    let (_, ext) = title.rsplit_once('.')?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// How a document's content is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ContentMode {
    /// Structured markup with formatting, lists, tables, etc.
    #[default]
    Rich,
    /// Raw unformatted text
    PlainText,
}

impl ContentMode {
    /// Determine the content mode selected by a title
    pub fn for_title(title: &str) -> Self {
        match extension_of(title) {
            Some(ext) if ext == PLAIN_TEXT_EXTENSION => Self::PlainText,
            _ => Self::Rich,
        }
    }

    pub fn is_plain_text(self) -> bool {
        self == Self::PlainText
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(extension_of("Notes.TXT").as_deref(), Some("txt"));
        assert_eq!(extension_of("notes.txt").as_deref(), Some("txt"));
    }

    #[test]
    fn test_extension_uses_last_segment() {
        assert_eq!(extension_of("my.file.name").as_deref(), Some("name"));
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of("draft.v-2"), None);
        assert_eq!(extension_of("spaced.t xt"), None);
    }

    #[test]
    fn test_mode_for_title() {
        assert_eq!(ContentMode::for_title("todo.txt"), ContentMode::PlainText);
        assert_eq!(ContentMode::for_title("TODO.Txt"), ContentMode::PlainText);
        assert_eq!(ContentMode::for_title("essay.md"), ContentMode::Rich);
        assert_eq!(ContentMode::for_title("Untitled"), ContentMode::Rich);
        assert_eq!(ContentMode::for_title("archive.txt.bak"), ContentMode::Rich);
    }
}
