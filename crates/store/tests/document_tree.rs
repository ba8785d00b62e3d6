//! Property and scenario tests for the document tree

use doc_model::{DocumentId, DocumentPatch};
use proptest::prelude::*;
use store::{deserialize_workspace, serialize_workspace, DocumentStore};

/// Build a store from (parent index, is_folder) pairs; a parent index refers
/// to an earlier entry, and non-folder parents are skipped.
fn build(shape: &[(Option<usize>, bool)]) -> (DocumentStore, Vec<DocumentId>) {
    let mut store = DocumentStore::new();
    let mut ids: Vec<DocumentId> = Vec::new();
    for &(parent, is_folder) in shape {
        let parent_id = parent
            .filter(|&p| p < ids.len())
            .map(|p| ids[p])
            .filter(|p| store.get(*p).is_some_and(|d| d.is_folder()));
        ids.push(store.create(parent_id, is_folder));
    }
    (store, ids)
}

fn tree_shape() -> impl Strategy<Value = Vec<(Option<usize>, bool)>> {
    prop::collection::vec((prop::option::of(0usize..20), any::<bool>()), 1..30)
}

proptest! {
    #[test]
    fn delete_leaves_no_dangling_parents(shape in tree_shape(), pick in any::<prop::sample::Index>()) {
        let (mut store, ids) = build(&shape);
        let target = ids[pick.index(ids.len())];
        let expected = store.descendants(target).len() + 1;
        let before = store.len();

        let removed = store.delete(target);

        prop_assert_eq!(removed.len(), expected);
        prop_assert_eq!(store.len(), before - expected);
        prop_assert!(!store.contains(target));
        for doc in store.documents() {
            if let Some(parent) = doc.parent_id() {
                prop_assert!(store.contains(parent));
            }
        }
        if let Some(active) = store.active_id() {
            prop_assert!(store.contains(active));
        }
    }

    #[test]
    fn workspace_round_trips(shape in tree_shape()) {
        let (store, _) = build(&shape);
        let loaded = deserialize_workspace(&serialize_workspace(&store).unwrap()).unwrap();
        prop_assert_eq!(loaded.table(), store.table());
        prop_assert_eq!(loaded.active_id(), store.active_id());
    }
}

#[test]
fn nested_folder_delete_removes_everything_below() {
    let mut store = DocumentStore::new();
    let projects = store.create(None, true);
    let drafts = store.create(Some(projects), true);
    let archive = store.create(Some(drafts), true);
    let chapter = store.create(Some(drafts), false);
    let old = store.create(Some(archive), false);
    let notes = store.create(None, false);
    store.rename(notes, "notes.txt");

    store.set_active(old);
    let removed = store.delete(projects);

    assert_eq!(removed.len(), 5);
    for id in [projects, drafts, archive, chapter, old] {
        assert!(!store.contains(id));
    }
    assert_eq!(store.active_id(), Some(notes));
    assert!(store.children(None).iter().all(|d| d.id() == notes));
}

#[test]
fn late_update_after_delete_is_ignored() {
    let mut store = DocumentStore::new();
    let doc = store.create(None, false);
    store.delete(doc);

    let snapshot = store.table().clone();
    assert!(!store.update(doc, DocumentPatch::new().content("late save")));
    assert_eq!(store.table(), &snapshot);
}
