//! Write transaction used by the resource and grant collaborators to load
//! the store. Every insert validates its input against the current state.

use heed::RwTxn;

use crate::constants::MAX_NAME_LEN;
use crate::db::Dbs;
use crate::error::{conflict, invalid, Result};
use crate::keys::{encode_component, grant_key, pair_key};
use crate::model::{validate_component_key, validate_uuid, Component, ComponentId, GrantSubject, GroupId, Role, UserId};

/// Transaction wrapper for batched writes
pub struct Tx<'e> {
    txn: RwTxn<'e>,
    dbs: &'e Dbs,
}

impl<'e> Tx<'e> {
    #[inline]
    pub(crate) fn new(txn: RwTxn<'e>, dbs: &'e Dbs) -> Self {
        Tx { txn, dbs }
    }

    #[inline]
    pub(crate) fn commit(self) -> Result<()> {
        self.txn.commit()?;
        Ok(())
    }

    /// Insert a component. Roots must be inserted before their descendants.
    pub fn insert_component(&mut self, c: &Component) -> Result<()> {
        c.id.validate()?;
        c.root_id.validate()?;
        validate_component_key(&c.key)?;
        validate_uuid(&c.uuid)?;
        let d = self.dbs;
        if d.components.get(&self.txn, &c.id.0)?.is_some() {
            return Err(conflict(format!("component {} already exists", c.id)));
        }
        if d.component_keys.get(&self.txn, &c.key)?.is_some() {
            return Err(conflict(format!("component key {:?} already exists", c.key)));
        }
        if d.component_uuids.get(&self.txn, &c.uuid)?.is_some() {
            return Err(conflict(format!("component uuid {:?} already exists", c.uuid)));
        }
        if !c.is_root() && d.roots.get(&self.txn, &c.root_id.0)?.is_none() {
            return Err(conflict(format!("root {} of component {} is not a known root", c.root_id, c.id)));
        }
        d.components.put(&mut self.txn, &c.id.0, &encode_component(c))?;
        d.component_keys.put(&mut self.txn, &c.key, &c.id.0)?;
        d.component_uuids.put(&mut self.txn, &c.uuid, &c.id.0)?;
        d.descendants.put(&mut self.txn, &pair_key(c.root_id.0, c.id.0), &())?;
        if c.is_root() {
            d.roots.put(&mut self.txn, &c.id.0, &())?;
        }
        Ok(())
    }

    pub fn insert_user(&mut self, id: UserId, login: &str) -> Result<()> {
        id.validate()?;
        validate_name("login", login)?;
        let d = self.dbs;
        if d.user_logins.get(&self.txn, &id.0)?.is_some() {
            return Err(conflict(format!("user {} already exists", id)));
        }
        if d.users.get(&self.txn, login)?.is_some() {
            return Err(conflict(format!("login {:?} already taken", login)));
        }
        d.users.put(&mut self.txn, login, &id.0)?;
        d.user_logins.put(&mut self.txn, &id.0, login)?;
        Ok(())
    }

    pub fn insert_group(&mut self, id: GroupId, name: &str) -> Result<()> {
        id.validate()?;
        validate_name("group name", name)?;
        let d = self.dbs;
        if d.groups.get(&self.txn, &id.0)?.is_some() {
            return Err(conflict(format!("group {} already exists", id)));
        }
        if d.group_names.get(&self.txn, name)?.is_some() {
            return Err(conflict(format!("group name {:?} already taken", name)));
        }
        d.groups.put(&mut self.txn, &id.0, name)?;
        d.group_names.put(&mut self.txn, name, &id.0)?;
        Ok(())
    }

    /// Add `user` to `group`. Adding an existing membership is a no-op.
    pub fn add_member(&mut self, user: UserId, group: GroupId) -> Result<()> {
        self.require_user(user)?;
        self.require_group(group)?;
        self.dbs.members.put(&mut self.txn, &pair_key(user.0, group.0), &())?;
        Ok(())
    }

    /// Persist one grant row. `target` must name a root component;
    /// `None` makes the grant global. Re-inserting a row is a no-op.
    pub fn insert_grant(&mut self, subject: GrantSubject, role: &str, target: Option<ComponentId>) -> Result<()> {
        let role = Role::new(role)?;
        match subject {
            GrantSubject::User(u) => self.require_user(u)?,
            GrantSubject::Group(g) => self.require_group(g)?,
            GrantSubject::Anyone => {}
        }
        if let Some(root) = target {
            if self.dbs.roots.get(&self.txn, &root.0)?.is_none() {
                return Err(conflict(format!("grant target {} is not a root component", root)));
            }
        }
        self.dbs.grants.put(&mut self.txn, &grant_key(subject, &role, target), &())?;
        Ok(())
    }

    fn require_user(&self, user: UserId) -> Result<()> {
        if self.dbs.user_logins.get(&self.txn, &user.0)?.is_none() {
            return Err(conflict(format!("unknown user {}", user)));
        }
        Ok(())
    }

    fn require_group(&self, group: GroupId) -> Result<()> {
        if self.dbs.groups.get(&self.txn, &group.0)?.is_none() {
            return Err(conflict(format!("unknown group {}", group)));
        }
        Ok(())
    }
}

fn validate_name(what: &str, name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(invalid(format!("{} must be 1..={} bytes", what, MAX_NAME_LEN)));
    }
    Ok(())
}
