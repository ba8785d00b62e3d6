//! Editing surface abstraction

/// A live editing surface: the widget the user types into.
///
/// The surface presents content in the bound document's own encoding:
/// markup for rich documents, raw text for plain-text documents.
pub trait EditingSurface: Send {
    /// Content currently displayed
    fn content(&self) -> String;

    /// Replace the displayed content (hydration and store-wins resync)
    fn set_content(&mut self, content: &str);
}

/// An in-memory surface for headless use and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferSurface {
    buffer: String,
    /// Number of times the session replaced the content
    hydrations: usize,
}

impl BufferSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user appending text
    pub fn type_text(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Simulate the user replacing everything
    pub fn replace(&mut self, text: &str) {
        self.buffer = text.to_string();
    }

    pub fn hydrations(&self) -> usize {
        self.hydrations
    }
}

impl EditingSurface for BufferSurface {
    fn content(&self) -> String {
        self.buffer.clone()
    }

    fn set_content(&mut self, content: &str) {
        self.buffer = content.to_string();
        self.hydrations += 1;
    }
}
