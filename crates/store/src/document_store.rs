//! The authoritative in-memory document table
//!
//! `DocumentStore` owns every document and folder in the workspace together
//! with the active-document pointer. It keeps a parent → children index so
//! cascading deletes never rescan the whole table.
//!
//! The store has no internal locking; callers share it as a [`SharedStore`]
//! and hold the lock only for the duration of a single operation.

use crate::{Result, StoreError};
use doc_model::{Document, DocumentId, DocumentPatch};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// A store shared between the application shell, sync sessions and autosave
pub type SharedStore = Arc<Mutex<DocumentStore>>;

/// Table of documents keyed by ID plus the active-document pointer
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: HashMap<DocumentId, Document>,
    active_document_id: Option<DocumentId>,
    /// Parent ID (as stored, possibly dangling) to child IDs
    children: HashMap<Option<DocumentId>, Vec<DocumentId>>,
    /// Bumped on every mutation
    revision: u64,
}

impl DocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted documents, rebuilding the child index
    pub fn from_parts(
        documents: HashMap<DocumentId, Document>,
        active_document_id: Option<DocumentId>,
    ) -> Self {
        let mut store = Self::new();
        store.replace_all(documents, active_document_id);
        store
    }

    /// Wrap this store for sharing
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// Replace the whole table, e.g. after loading from disk
    pub fn replace_all(
        &mut self,
        documents: HashMap<DocumentId, Document>,
        active_document_id: Option<DocumentId>,
    ) {
        self.documents = documents;
        self.active_document_id = active_document_id;
        self.rebuild_index();
        self.revision += 1;
    }

    fn rebuild_index(&mut self) {
        self.children.clear();
        for doc in self.documents.values() {
            self.children.entry(doc.parent_id()).or_default().push(doc.id());
        }
    }

    fn index_insert(&mut self, parent: Option<DocumentId>, id: DocumentId) {
        self.children.entry(parent).or_default().push(id);
    }

    fn index_remove(&mut self, parent: Option<DocumentId>, id: DocumentId) {
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|&child| child != id);
            if siblings.is_empty() {
                self.children.remove(&parent);
            }
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a document or folder and return its new ID.
    ///
    /// Documents become active; folders do not.
    pub fn create(&mut self, parent_id: Option<DocumentId>, is_folder: bool) -> DocumentId {
        let mut id = DocumentId::new();
        while self.documents.contains_key(&id) {
            id = DocumentId::new();
        }

        self.documents.insert(id, Document::new(id, parent_id, is_folder));
        self.index_insert(parent_id, id);
        if !is_folder {
            self.active_document_id = Some(id);
        }
        self.revision += 1;

        tracing::debug!(%id, is_folder, "created document");
        id
    }

    /// Merge a patch into a document.
    ///
    /// Returns `false` and leaves the table untouched when the ID is unknown,
    /// which happens when a late save lands after a delete. An invalid parent
    /// change is skipped while the remaining fields still apply.
    pub fn update(&mut self, id: DocumentId, mut patch: DocumentPatch) -> bool {
        if !self.documents.contains_key(&id) {
            tracing::debug!(%id, "ignoring update for missing document");
            return false;
        }

        if let Some(new_parent) = patch.parent_id {
            if let Err(e) = self.check_parent(id, new_parent) {
                tracing::warn!(%id, "skipping parent change: {}", e);
                patch.parent_id = None;
            }
        }

        let Some(doc) = self.documents.get_mut(&id) else {
            return false;
        };
        let old_parent = doc.parent_id();
        doc.apply(patch);
        let new_parent = doc.parent_id();

        if old_parent != new_parent {
            self.index_remove(old_parent, id);
            self.index_insert(new_parent, id);
        }
        self.revision += 1;
        true
    }

    /// Change only the title of a document
    pub fn rename(&mut self, id: DocumentId, title: impl Into<String>) -> bool {
        self.update(id, DocumentPatch::new().title(title))
    }

    /// Move a document under a folder, or to the root with `None`
    pub fn move_document(&mut self, id: DocumentId, new_parent: Option<DocumentId>) -> Result<()> {
        if !self.documents.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        self.check_parent(id, new_parent)?;
        self.update(id, DocumentPatch::new().parent(new_parent));
        Ok(())
    }

    /// Delete a document and all of its descendants.
    ///
    /// Returns the removed IDs; empty when the ID is unknown. If the active
    /// document was removed, another document becomes active.
    pub fn delete(&mut self, id: DocumentId) -> Vec<DocumentId> {
        let Some(doc) = self.documents.get(&id) else {
            tracing::debug!(%id, "ignoring delete for missing document");
            return Vec::new();
        };
        let parent = doc.parent_id();

        let mut removed = vec![id];
        removed.extend(self.descendants(id));

        self.index_remove(parent, id);
        for removed_id in &removed {
            self.documents.remove(removed_id);
            self.children.remove(&Some(*removed_id));
        }

        if self
            .active_document_id
            .is_some_and(|active| removed.contains(&active))
        {
            self.active_document_id = self.fallback_active();
        }
        self.revision += 1;

        tracing::info!(%id, removed = removed.len(), "deleted document subtree");
        removed
    }

    /// Point the active pointer at `id` without validating it
    pub fn set_active(&mut self, id: DocumentId) {
        self.active_document_id = Some(id);
        self.revision += 1;
    }

    /// Clear the active pointer
    pub fn clear_active(&mut self) {
        self.active_document_id = None;
        self.revision += 1;
    }

    /// Most recently updated remaining document, preferring editable ones
    fn fallback_active(&self) -> Option<DocumentId> {
        newest(self.documents.values().filter(|d| d.is_editable()))
            .or_else(|| newest(self.documents.values()))
    }

    /// Validate that `parent` may become the parent of `id`
    fn check_parent(&self, id: DocumentId, parent: Option<DocumentId>) -> Result<()> {
        let Some(parent) = parent else {
            return Ok(());
        };
        let parent_doc = self.documents.get(&parent).ok_or(StoreError::NotFound(parent))?;
        if !parent_doc.is_folder() {
            return Err(StoreError::NotAFolder(parent));
        }
        if parent == id || self.ancestors(parent).contains(&id) {
            return Err(StoreError::CycleDetected { id, parent });
        }
        Ok(())
    }

    /// Set a parent without validation; used by integrity repair
    pub(crate) fn force_parent(&mut self, id: DocumentId, parent: Option<DocumentId>) {
        let Some(doc) = self.documents.get_mut(&id) else {
            return;
        };
        let old_parent = doc.parent_id();
        doc.apply(DocumentPatch::new().parent(parent));
        self.index_remove(old_parent, id);
        self.index_insert(parent, id);
        self.revision += 1;
    }

    // ------------------------------------------------------------------
    // Readers
    // ------------------------------------------------------------------

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.documents.contains_key(&id)
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.active_document_id
    }

    /// The active document, if the pointer refers to an existing one
    pub fn active_document(&self) -> Option<&Document> {
        self.active_document_id.and_then(|id| self.documents.get(&id))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// All documents in unspecified order
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// The raw table, for persistence
    pub fn table(&self) -> &HashMap<DocumentId, Document> {
        &self.documents
    }

    /// Direct children of `parent`, oldest first.
    ///
    /// `None` lists root-level documents, including any whose parent no
    /// longer exists.
    pub fn children(&self, parent: Option<DocumentId>) -> Vec<&Document> {
        let mut ids: Vec<DocumentId> = self.children.get(&parent).cloned().unwrap_or_default();
        if parent.is_none() {
            for (key, child_ids) in &self.children {
                if matches!(key, Some(p) if !self.documents.contains_key(p)) {
                    ids.extend(child_ids.iter().copied());
                }
            }
        }

        let mut docs: Vec<&Document> = ids.iter().filter_map(|id| self.documents.get(id)).collect();
        docs.sort_by_key(|d| (d.created_at(), d.id()));
        docs
    }

    /// All transitive children of `id`, breadth first
    pub fn descendants(&self, id: DocumentId) -> Vec<DocumentId> {
        let mut result = Vec::new();
        let mut seen: HashSet<DocumentId> = HashSet::from([id]);
        let mut queue = vec![id];

        while let Some(current) = queue.pop() {
            for &child in self.children.get(&Some(current)).into_iter().flatten() {
                if seen.insert(child) {
                    result.push(child);
                    queue.push(child);
                }
            }
        }
        result
    }

    /// Ancestors of `id`, nearest first, stopping at a dangling parent
    pub fn ancestors(&self, id: DocumentId) -> Vec<DocumentId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.documents.get(&id).and_then(Document::parent_id);

        while let Some(parent) = current {
            if !self.documents.contains_key(&parent) || !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = self.documents.get(&parent).and_then(Document::parent_id);
        }
        chain
    }

    /// Path from the root down to `id` (inclusive)
    pub fn path(&self, id: DocumentId) -> Vec<DocumentId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut path = self.ancestors(id);
        path.reverse();
        path.push(id);
        path
    }
}

fn newest<'a>(docs: impl Iterator<Item = &'a Document>) -> Option<DocumentId> {
    docs.max_by_key(|d| (d.updated_at(), d.id())).map(Document::id)
}
