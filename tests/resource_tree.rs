//! Component lookup tests

mod helpers;

use helpers::*;
use permtree::{ComponentId, PermtreeError, ResourceTree, Scope};

fn tree() -> (TestStore, ResourceTree<permtree::Store>) {
    let t = setup_tree();
    let tree = ResourceTree::new(t.store.clone());
    (t, tree)
}

// ============================================================================
// Single lookups
// ============================================================================

#[test]
fn component_by_id() {
    let (_t, tree) = tree();
    let c = tree.component_by_id(FILE_ID).unwrap();
    assert_eq!(c.key, FILE);
    assert_eq!(c.root_id, PROJECT_ID);
    assert_eq!(c.scope, Scope::File);
    assert!(!c.is_root());

    assert!(tree.component_by_id(PROJECT_ID).unwrap().is_root());
    assert!(tree.exists(PACKAGE_ID).unwrap());
    assert!(!tree.exists(ComponentId(9999)).unwrap());
}

#[test]
fn missing_component_is_not_found() {
    let (_t, tree) = tree();
    assert!(tree.find_component_by_id(ComponentId(9999)).unwrap().is_none());
    let err = tree.component_by_id(ComponentId(9999)).unwrap_err();
    assert!(matches!(err, PermtreeError::NotFound { kind: "component", .. }), "{:?}", err);
    assert!(matches!(tree.component_by_key("nope"), Err(PermtreeError::NotFound { .. })));
    assert!(matches!(tree.component_by_uuid("NOPE"), Err(PermtreeError::NotFound { .. })));
}

#[test]
fn lookup_by_key_and_uuid() {
    let (_t, tree) = tree();
    let by_key = tree.component_by_key(PROJECT).unwrap();
    let by_uuid = tree.component_by_uuid(PROJECT_UUID).unwrap();
    assert_eq!(by_key, by_uuid);
    assert_eq!(by_key.id, PROJECT_ID);
}

/// A descendant's root is its project; a root is its own root
#[test]
fn root_component_by_key() {
    let (_t, tree) = tree();
    assert_eq!(tree.root_component_by_key(FILE).unwrap().key, PROJECT);
    assert_eq!(tree.root_component_by_key(FILE_IN_OTHER_PROJECT).unwrap().key, OTHER_PROJECT);
    assert_eq!(tree.root_component_by_key(EMPTY_PROJECT).unwrap().id, EMPTY_PROJECT_ID);
    assert!(tree.find_root_component_by_key("nope").unwrap().is_none());
}

// ============================================================================
// Bulk lookups
// ============================================================================

/// Unknown uuids are skipped and the rest come back sorted by id
#[test]
fn components_by_uuids() {
    let (_t, tree) = tree();
    let found = tree
        .components_by_uuids([EMPTY_PROJECT_UUID, "missing", PROJECT_UUID, "ABCD-file"])
        .unwrap();
    let ids: Vec<ComponentId> = found.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![PROJECT_ID, FILE_ID, EMPTY_PROJECT_ID]);

    assert!(tree.components_by_uuids(Vec::<String>::new()).unwrap().is_empty());
}

/// Small chunks give the same answer as one chunk
#[test]
fn components_by_uuids_chunked() {
    let (t, tree) = tree();
    let small = ResourceTree::new(t.store.clone()).with_chunk_size(1).unwrap();
    let uuids = [PROJECT_UUID, OTHER_PROJECT_UUID, EMPTY_PROJECT_UUID, "ABCD-pkg"];
    assert_eq!(tree.components_by_uuids(uuids).unwrap(), small.components_by_uuids(uuids).unwrap());
    assert!(ResourceTree::new(t.store.clone()).with_chunk_size(0).is_err());
}

#[test]
fn modules_of_project() {
    let (t, tree) = tree();
    let modules = tree.modules_of_project(PROJECT).unwrap();
    assert_eq!(modules.iter().map(|c| c.id).collect::<Vec<_>>(), vec![MODULE_ID]);

    // asking through a descendant's key resolves the same project
    assert_eq!(tree.modules_of_project(FILE).unwrap(), modules);
    assert!(tree.modules_of_project(EMPTY_PROJECT).unwrap().is_empty());
    assert!(matches!(tree.modules_of_project("nope"), Err(PermtreeError::NotFound { .. })));

    t.store
        .transact(|tx| {
            tx.insert_component(&permtree::Component::child(
                307,
                PROJECT_ID.0,
                "ABCD-mod-a",
                "pj-w-snapshot:a-module",
                Scope::Module,
            ))
        })
        .unwrap();
    let keys: Vec<String> = tree.modules_of_project(PROJECT).unwrap().into_iter().map(|c| c.key).collect();
    assert_eq!(keys, vec!["pj-w-snapshot:a-module".to_string(), MODULE.to_string()]);
}

#[test]
fn root_uuids_sorted() {
    let (_t, tree) = tree();
    assert_eq!(
        tree.root_uuids().unwrap(),
        vec![PROJECT_UUID.to_string(), EMPTY_PROJECT_UUID.to_string(), OTHER_PROJECT_UUID.to_string()]
    );
}
