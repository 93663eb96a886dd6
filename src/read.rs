//! Snapshot reads over one LMDB read transaction

use std::collections::HashMap;

use heed::RoTxn;

use crate::db::Dbs;
use crate::error::{corrupt, Result};
use crate::keys::{decode_component, grant_key, parse_grant_key, read_u64, record_root_id, role_prefix, subject_prefix};
use crate::model::{Component, ComponentId, GrantSubject, GroupId, Role, UserId};
use crate::store::{GrantRow, Snapshot};

/// [`Snapshot`] bound to a live read (or write) transaction
pub(crate) struct LmdbSnapshot<'a, 'e> {
    dbs: &'a Dbs,
    txn: &'a RoTxn<'e>,
}

impl<'a, 'e> LmdbSnapshot<'a, 'e> {
    pub(crate) fn new(dbs: &'a Dbs, txn: &'a RoTxn<'e>) -> Self {
        LmdbSnapshot { dbs, txn }
    }

    /// Root id of a component that the key/uuid index says exists
    fn indexed_root(&self, id: ComponentId) -> Result<ComponentId> {
        let rec = self
            .dbs
            .components
            .get(self.txn, &id.0)?
            .ok_or_else(|| corrupt(format!("index points at missing component {}", id)))?;
        record_root_id(rec).ok_or_else(|| corrupt(format!("component record {}", id)))
    }

    fn indexed_component(&self, id: ComponentId) -> Result<Component> {
        self.component(id)?
            .ok_or_else(|| corrupt(format!("index points at missing component {}", id)))
    }
}

impl Snapshot for LmdbSnapshot<'_, '_> {
    fn component(&self, id: ComponentId) -> Result<Option<Component>> {
        match self.dbs.components.get(self.txn, &id.0)? {
            Some(rec) => Ok(Some(decode_component(id, rec)?)),
            None => Ok(None),
        }
    }

    fn component_id_by_key(&self, key: &str) -> Result<Option<ComponentId>> {
        Ok(self.dbs.component_keys.get(self.txn, key)?.map(ComponentId))
    }

    fn component_id_by_uuid(&self, uuid: &str) -> Result<Option<ComponentId>> {
        Ok(self.dbs.component_uuids.get(self.txn, uuid)?.map(ComponentId))
    }

    fn root_ids_by_keys(&self, keys: &[String]) -> Result<HashMap<String, ComponentId>> {
        let mut r = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(id) = self.component_id_by_key(key)? {
                r.insert(key.clone(), self.indexed_root(id)?);
            }
        }
        Ok(r)
    }

    fn root_ids_by_ids(&self, ids: &[ComponentId]) -> Result<HashMap<ComponentId, ComponentId>> {
        let mut r = HashMap::with_capacity(ids.len());
        for &id in ids {
            if let Some(rec) = self.dbs.components.get(self.txn, &id.0)? {
                let root = record_root_id(rec).ok_or_else(|| corrupt(format!("component record {}", id)))?;
                r.insert(id, root);
            }
        }
        Ok(r)
    }

    fn root_components(&self) -> Result<Vec<Component>> {
        let mut r = Vec::new();
        for item in self.dbs.roots.iter(self.txn)? {
            let (id, ()) = item?;
            r.push(self.indexed_component(ComponentId(id))?);
        }
        Ok(r)
    }

    fn components_under(&self, root: ComponentId) -> Result<Vec<Component>> {
        let mut r = Vec::new();
        for item in self.dbs.descendants.prefix_iter(self.txn, &root.0.to_be_bytes())? {
            let (k, ()) = item?;
            let id = k.get(8..16).and_then(read_u64).ok_or_else(|| corrupt("descendant key"))?;
            r.push(self.indexed_component(ComponentId(id))?);
        }
        Ok(r)
    }

    fn user_by_login(&self, login: &str) -> Result<Option<UserId>> {
        Ok(self.dbs.users.get(self.txn, login)?.map(UserId))
    }

    fn groups_of(&self, user: UserId) -> Result<Vec<GroupId>> {
        let mut r = Vec::new();
        for item in self.dbs.members.prefix_iter(self.txn, &user.0.to_be_bytes())? {
            let (k, ()) = item?;
            let group = k.get(8..16).and_then(read_u64).ok_or_else(|| corrupt("membership key"))?;
            r.push(GroupId(group));
        }
        Ok(r)
    }

    fn grants_of(&self, subject: GrantSubject, role: Option<&Role>) -> Result<Vec<GrantRow>> {
        let prefix = match role {
            Some(role) => role_prefix(subject, role),
            None => subject_prefix(subject),
        };
        let mut r = Vec::new();
        for item in self.dbs.grants.prefix_iter(self.txn, &prefix)? {
            let (k, ()) = item?;
            let (role, target) = parse_grant_key(k)?;
            r.push(GrantRow { role, target });
        }
        Ok(r)
    }

    fn has_grant(&self, subject: GrantSubject, role: &Role, target: Option<ComponentId>) -> Result<bool> {
        Ok(self.dbs.grants.get(self.txn, &grant_key(subject, role, target))?.is_some())
    }
}
