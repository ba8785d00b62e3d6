//! Document records and partial updates

use crate::{extension_of, ContentMode, DocumentId};
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

/// Default title for a new document
pub const DEFAULT_DOCUMENT_TITLE: &str = "Untitled";

/// Default title for a new folder
pub const DEFAULT_FOLDER_TITLE: &str = "New Folder";

/// Content of a new rich document: a single empty paragraph
pub const EMPTY_RICH_CONTENT: &str = "<p></p>";

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}

/// A document or folder in the workspace table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    id: DocumentId,
    title: String,
    content: String,
    #[serde(default)]
    parent_id: Option<DocumentId>,
    #[serde(default)]
    is_folder: bool,
    created_at: Timestamp,
    updated_at: Timestamp,
    /// Cached word count; advisory only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    word_count: Option<usize>,
}

impl Document {
    /// Create a new document or folder with default title and content
    pub fn new(id: DocumentId, parent_id: Option<DocumentId>, is_folder: bool) -> Self {
        let now = now_millis();
        let (title, content) = if is_folder {
            (DEFAULT_FOLDER_TITLE, "")
        } else {
            (DEFAULT_DOCUMENT_TITLE, EMPTY_RICH_CONTENT)
        };

        Self {
            id,
            title: title.to_string(),
            content: content.to_string(),
            parent_id,
            is_folder,
            created_at: now,
            updated_at: now,
            word_count: None,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn parent_id(&self) -> Option<DocumentId> {
        self.parent_id
    }

    pub fn is_folder(&self) -> bool {
        self.is_folder
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn word_count(&self) -> Option<usize> {
        self.word_count
    }

    /// Lowercase title extension, if any
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.title)
    }

    /// Content encoding selected by the title
    pub fn mode(&self) -> ContentMode {
        ContentMode::for_title(&self.title)
    }

    /// Whether the document can be bound to an editing surface
    pub fn is_editable(&self) -> bool {
        !self.is_folder
    }

    /// Merge a patch into this document and refresh `updated_at`.
    ///
    /// The caller is responsible for validating any parent change.
    pub fn apply(&mut self, patch: DocumentPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(parent_id) = patch.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(word_count) = patch.word_count {
            self.word_count = word_count;
        }
        self.touch();
    }

    /// Refresh `updated_at`; never moves it backwards
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at);
    }
}

/// A partial update to a document. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// `Some(None)` moves the document to the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<DocumentId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<Option<usize>>,
}

impl DocumentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn parent(mut self, parent_id: Option<DocumentId>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn word_count(mut self, count: usize) -> Self {
        self.word_count = Some(Some(count));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.parent_id.is_none()
            && self.word_count.is_none()
    }
}
