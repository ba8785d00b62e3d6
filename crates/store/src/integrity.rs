//! Workspace integrity checking and repair
//!
//! The store tolerates dangling parent references by rendering such
//! documents at the root. This module reports those and other structural
//! problems found in persisted workspaces, and can repair them.

use crate::{DocumentStore, Result};
use content::DocumentStats;
use doc_model::{Document, DocumentId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Integrity check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// Whether the workspace passed all checks that matter
    pub is_valid: bool,
    /// List of issues found
    pub issues: Vec<IntegrityIssue>,
    /// Statistics about the workspace
    pub stats: WorkspaceStats,
}

/// Types of integrity issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IntegrityIssue {
    /// A document references a parent that does not exist
    DanglingParent { id: DocumentId, parent_id: DocumentId },
    /// A document's parent is a document rather than a folder
    ParentIsNotFolder { id: DocumentId, parent_id: DocumentId },
    /// A document's parent chain loops back to itself
    Cycle { id: DocumentId },
    /// The active pointer refers to a missing document
    ActiveMissing { active_id: DocumentId },
}

impl IntegrityIssue {
    /// Get the severity of this issue
    pub fn severity(&self) -> IssueSeverity {
        match self {
            IntegrityIssue::DanglingParent { .. } => IssueSeverity::Warning,
            IntegrityIssue::ParentIsNotFolder { .. } => IssueSeverity::Warning,
            IntegrityIssue::Cycle { .. } => IssueSeverity::Critical,
            IntegrityIssue::ActiveMissing { .. } => IssueSeverity::Info,
        }
    }
}

/// Severity levels for integrity issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueSeverity {
    /// Informational, workspace is fully usable
    Info,
    /// Warning, workspace renders but structure is off
    Warning,
    /// Critical, tree operations may misbehave
    Critical,
}

/// Workspace statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceStats {
    /// Number of editable documents
    pub document_count: usize,
    /// Number of folders
    pub folder_count: usize,
    /// Words across all documents
    pub word_count: usize,
    /// Characters across all documents
    pub character_count: usize,
}

/// A repair applied to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RepairAction {
    /// A document was moved to the root
    MovedToRoot { id: DocumentId },
    /// The active pointer was moved to another document or cleared
    ReassignedActive { active_id: Option<DocumentId> },
}

/// Integrity checker for workspaces
pub struct IntegrityChecker;

impl IntegrityChecker {
    /// Create a new integrity checker
    pub fn new() -> Self {
        Self
    }

    /// Check a workspace's integrity
    pub fn check(&self, store: &DocumentStore) -> IntegrityReport {
        let mut issues = Vec::new();

        let mut docs: Vec<&Document> = store.documents().collect();
        docs.sort_by_key(|d| (d.created_at(), d.id()));

        for doc in &docs {
            let Some(parent_id) = doc.parent_id() else {
                continue;
            };
            match store.get(parent_id) {
                None => issues.push(IntegrityIssue::DanglingParent { id: doc.id(), parent_id }),
                Some(parent) if !parent.is_folder() => {
                    issues.push(IntegrityIssue::ParentIsNotFolder { id: doc.id(), parent_id })
                }
                Some(_) => {}
            }
            if in_cycle(store, doc.id()) {
                issues.push(IntegrityIssue::Cycle { id: doc.id() });
            }
        }

        if let Some(active_id) = store.active_id() {
            if !store.contains(active_id) {
                issues.push(IntegrityIssue::ActiveMissing { active_id });
            }
        }

        IntegrityReport {
            is_valid: issues.iter().all(|i| i.severity() == IssueSeverity::Info),
            issues,
            stats: self.compute_stats(store),
        }
    }

    /// Check a workspace file's integrity
    pub async fn check_file(&self, path: impl AsRef<Path>) -> Result<IntegrityReport> {
        let store = crate::load_workspace(path).await?;
        Ok(self.check(&store))
    }

    /// Compute workspace statistics
    pub fn compute_stats(&self, store: &DocumentStore) -> WorkspaceStats {
        let mut stats = WorkspaceStats::default();
        for doc in store.documents() {
            if doc.is_folder() {
                stats.folder_count += 1;
                continue;
            }
            let doc_stats = DocumentStats::for_document(doc);
            stats.document_count += 1;
            stats.word_count += doc_stats.words;
            stats.character_count += doc_stats.characters;
        }
        stats
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether following parents from `id` leads back to `id`
fn in_cycle(store: &DocumentStore, id: DocumentId) -> bool {
    let mut seen = HashSet::new();
    let mut current = store.get(id).and_then(Document::parent_id);
    while let Some(parent) = current {
        if parent == id {
            return true;
        }
        if !seen.insert(parent) {
            return false;
        }
        current = store.get(parent).and_then(Document::parent_id);
    }
    false
}

/// Workspace repair functionality
pub struct WorkspaceRepairer;

impl WorkspaceRepairer {
    /// Create a new workspace repairer
    pub fn new() -> Self {
        Self
    }

    /// Attempt to repair a workspace based on integrity issues
    pub fn repair(&self, store: &mut DocumentStore, issues: &[IntegrityIssue]) -> Vec<RepairAction> {
        issues
            .iter()
            .filter_map(|issue| self.repair_issue(store, issue))
            .collect()
    }

    /// Repair a single issue
    fn repair_issue(&self, store: &mut DocumentStore, issue: &IntegrityIssue) -> Option<RepairAction> {
        match issue {
            IntegrityIssue::DanglingParent { id, .. } | IntegrityIssue::ParentIsNotFolder { id, .. } => {
                store.get(*id)?;
                store.force_parent(*id, None);
                Some(RepairAction::MovedToRoot { id: *id })
            }
            IntegrityIssue::Cycle { id } => {
                // An earlier repair may already have broken this loop
                if !in_cycle(store, *id) {
                    return None;
                }
                store.force_parent(*id, None);
                Some(RepairAction::MovedToRoot { id: *id })
            }
            IntegrityIssue::ActiveMissing { .. } => {
                let replacement = store
                    .documents()
                    .filter(|d| d.is_editable())
                    .max_by_key(|d| (d.updated_at(), d.id()))
                    .map(Document::id);
                match replacement {
                    Some(id) => store.set_active(id),
                    None => store.clear_active(),
                }
                Some(RepairAction::ReassignedActive { active_id: replacement })
            }
        }
    }
}

impl Default for WorkspaceRepairer {
    fn default() -> Self {
        Self::new()
    }
}
