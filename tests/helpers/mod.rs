//! Shared fixtures for the integration tests.
//!
//! The component tree mirrors the canonical dataset: a project with a
//! package and a file, an empty project, and a file living in another,
//! never-granted project.

#![allow(dead_code)]

use permtree::{Component, ComponentId, Config, GroupId, Scope, Store, Tx, UserId};
use tempfile::TempDir;

pub const USER: UserId = UserId(100);
pub const OTHER_USER: UserId = UserId(101);
pub const GROUP: GroupId = GroupId(200);

pub const PROJECT: &str = "pj-w-snapshot";
pub const PACKAGE: &str = "pj-w-snapshot:package";
pub const FILE: &str = "pj-w-snapshot:file";
pub const MODULE: &str = "pj-w-snapshot:module";
pub const OTHER_PROJECT: &str = "pj-other";
pub const FILE_IN_OTHER_PROJECT: &str = "another";
pub const EMPTY_PROJECT: &str = "pj-wo-snapshot";

pub const PROJECT_ID: ComponentId = ComponentId(300);
pub const PACKAGE_ID: ComponentId = ComponentId(301);
pub const FILE_ID: ComponentId = ComponentId(302);
pub const OTHER_PROJECT_ID: ComponentId = ComponentId(303);
pub const FILE_IN_OTHER_PROJECT_ID: ComponentId = ComponentId(304);
pub const EMPTY_PROJECT_ID: ComponentId = ComponentId(305);
pub const MODULE_ID: ComponentId = ComponentId(306);

pub const PROJECT_UUID: &str = "ABCD";
pub const EMPTY_PROJECT_UUID: &str = "EFGH";
pub const OTHER_PROJECT_UUID: &str = "IJKL";

/// A store in its own temp directory. Keep the `TempDir` alive for the test.
pub struct TestStore {
    pub store: Store,
    _dir: TempDir,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn setup() -> TestStore {
    setup_with(&Config { map_size: 1 << 26, ..Config::default() })
}

pub fn setup_with(config: &Config) -> TestStore {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let store = Store::open(dir.path(), config).unwrap();
    TestStore { store, _dir: dir }
}

/// The component tree plus USER (member of GROUP) and OTHER_USER
pub fn setup_tree() -> TestStore {
    let t = setup();
    t.store.transact(|tx| load_tree(tx)).unwrap();
    t
}

pub fn load_tree(tx: &mut Tx<'_>) -> permtree::Result<()> {
    tx.insert_component(&Component::root(PROJECT_ID.0, PROJECT_UUID, PROJECT))?;
    tx.insert_component(&Component::child(PACKAGE_ID.0, PROJECT_ID.0, "ABCD-pkg", PACKAGE, Scope::Directory))?;
    tx.insert_component(&Component::child(FILE_ID.0, PROJECT_ID.0, "ABCD-file", FILE, Scope::File))?;
    tx.insert_component(&Component::child(MODULE_ID.0, PROJECT_ID.0, "ABCD-mod", MODULE, Scope::Module))?;
    tx.insert_component(&Component::root(OTHER_PROJECT_ID.0, OTHER_PROJECT_UUID, OTHER_PROJECT))?;
    tx.insert_component(&Component::child(
        FILE_IN_OTHER_PROJECT_ID.0,
        OTHER_PROJECT_ID.0,
        "IJKL-file",
        FILE_IN_OTHER_PROJECT,
        Scope::File,
    ))?;
    tx.insert_component(&Component::root(EMPTY_PROJECT_ID.0, EMPTY_PROJECT_UUID, EMPTY_PROJECT))?;
    tx.insert_user(USER, "marius")?;
    tx.insert_user(OTHER_USER, "simon")?;
    tx.insert_group(GROUP, "sonar-users")?;
    tx.add_member(USER, GROUP)
}

/// The five keys every filtering scenario asks about
pub fn scenario_keys() -> Vec<String> {
    [PROJECT, PACKAGE, FILE, FILE_IN_OTHER_PROJECT, EMPTY_PROJECT]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

pub fn set_of(keys: &[&str]) -> std::collections::HashSet<String> {
    keys.iter().map(|k| k.to_string()).collect()
}
