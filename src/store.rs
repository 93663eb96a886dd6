//! The read-only surface the engine needs from a component/grant store.
//!
//! Everything the engine asks during one call goes through a single
//! [`Snapshot`], so all chunk queries of that call observe the same state.

use std::collections::HashMap;

use crate::error::Result;
use crate::model::{Component, ComponentId, GrantSubject, GroupId, Role, UserId};

/// One grant row as seen from its subject
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrantRow {
    pub role: Role,
    pub target: Option<ComponentId>,
}

/// Queries answered against one consistent view of the store
pub trait Snapshot {
    fn component(&self, id: ComponentId) -> Result<Option<Component>>;
    fn component_id_by_key(&self, key: &str) -> Result<Option<ComponentId>>;
    fn component_id_by_uuid(&self, uuid: &str) -> Result<Option<ComponentId>>;

    /// Root id of each known key. Unknown keys are absent from the map.
    fn root_ids_by_keys(&self, keys: &[String]) -> Result<HashMap<String, ComponentId>>;
    /// Root id of each known id. Unknown ids are absent from the map.
    fn root_ids_by_ids(&self, ids: &[ComponentId]) -> Result<HashMap<ComponentId, ComponentId>>;

    /// All root components, in id order
    fn root_components(&self) -> Result<Vec<Component>>;
    /// All components whose root is `root`, the root included
    fn components_under(&self, root: ComponentId) -> Result<Vec<Component>>;

    fn user_by_login(&self, login: &str) -> Result<Option<UserId>>;
    fn groups_of(&self, user: UserId) -> Result<Vec<GroupId>>;

    /// Grant rows held by `subject`, optionally restricted to one role
    fn grants_of(&self, subject: GrantSubject, role: Option<&Role>) -> Result<Vec<GrantRow>>;
    /// Whether this exact row exists
    fn has_grant(&self, subject: GrantSubject, role: &Role, target: Option<ComponentId>) -> Result<bool>;
}

/// A store that can hand out consistent snapshots
pub trait GrantStore {
    /// Run `f` against one snapshot. The snapshot does not outlive the call.
    fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Snapshot) -> Result<T>;
}

impl<S: GrantStore> GrantStore for &S {
    fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Snapshot) -> Result<T>,
    {
        (**self).read(f)
    }
}

impl<S: GrantStore> GrantStore for std::sync::Arc<S> {
    fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Snapshot) -> Result<T>,
    {
        (**self).read(f)
    }
}
