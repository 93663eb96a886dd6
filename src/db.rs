//! LMDB-backed component and grant store

use std::path::{Path, PathBuf};

use heed::types::{Bytes, Str, U64, Unit};
use heed::{Database, Env, EnvOpenOptions};

use crate::config::Config;
use crate::constants::MAX_DBS;
use crate::error::Result;
use crate::read::LmdbSnapshot;
use crate::store::{GrantStore, Snapshot};
use crate::tx::Tx;

pub(crate) type BE = byteorder::BigEndian;
pub(crate) type IdDb<V> = Database<U64<BE>, V>;
pub(crate) type NameDb = Database<Str, U64<BE>>;

/// All database handles
#[derive(Clone, Copy)]
pub(crate) struct Dbs {
    /// id -> encoded component record
    pub components: IdDb<Bytes>,
    /// component key -> id
    pub component_keys: NameDb,
    /// component uuid -> id
    pub component_uuids: NameDb,
    /// ids of root components
    pub roots: IdDb<Unit>,
    /// pair_key(root, component), the root itself included
    pub descendants: Database<Bytes, Unit>,
    /// login -> user id
    pub users: NameDb,
    /// user id -> login
    pub user_logins: IdDb<Str>,
    /// group id -> name
    pub groups: IdDb<Str>,
    /// group name -> id
    pub group_names: NameDb,
    /// pair_key(user, group)
    pub members: Database<Bytes, Unit>,
    /// grant_key(subject, role, target)
    pub grants: Database<Bytes, Unit>,
}

/// Handle on an opened store. Cheap to clone; clones share the environment.
#[derive(Clone)]
pub struct Store {
    env: Env,
    dbs: Dbs,
    path: PathBuf,
}

impl Store {
    /// Open (creating if needed) the store at `path`
    pub fn open(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        // SAFETY: LMDB requires no other process to open this path with
        // incompatible options while the environment is live.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(config.map_size)
                .max_readers(config.max_readers)
                .max_dbs(MAX_DBS)
                .open(path)?
        };
        let mut tx = env.write_txn()?;
        let dbs = Dbs {
            components: env.create_database(&mut tx, Some("components"))?,
            component_keys: env.create_database(&mut tx, Some("component_keys"))?,
            component_uuids: env.create_database(&mut tx, Some("component_uuids"))?,
            roots: env.create_database(&mut tx, Some("roots"))?,
            descendants: env.create_database(&mut tx, Some("descendants"))?,
            users: env.create_database(&mut tx, Some("users"))?,
            user_logins: env.create_database(&mut tx, Some("user_logins"))?,
            groups: env.create_database(&mut tx, Some("groups"))?,
            group_names: env.create_database(&mut tx, Some("group_names"))?,
            members: env.create_database(&mut tx, Some("members"))?,
            grants: env.create_database(&mut tx, Some("grants"))?,
        };
        tx.commit()?;
        tracing::info!(path = %path.display(), map_size = config.map_size, "store opened");
        Ok(Store { env, dbs, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run several writes in one transaction. Nothing is committed if `f` fails.
    pub fn transact<T, F: FnOnce(&mut Tx<'_>) -> Result<T>>(&self, f: F) -> Result<T> {
        let mut tx = Tx::new(self.env.write_txn()?, &self.dbs);
        let r = f(&mut tx)?;
        tx.commit()?;
        Ok(r)
    }

    /// Clear all databases
    pub fn clear_all(&self) -> Result<()> {
        let mut tx = self.env.write_txn()?;
        let d = &self.dbs;
        d.components.clear(&mut tx)?;
        d.component_keys.clear(&mut tx)?;
        d.component_uuids.clear(&mut tx)?;
        d.roots.clear(&mut tx)?;
        d.descendants.clear(&mut tx)?;
        d.users.clear(&mut tx)?;
        d.user_logins.clear(&mut tx)?;
        d.groups.clear(&mut tx)?;
        d.group_names.clear(&mut tx)?;
        d.members.clear(&mut tx)?;
        d.grants.clear(&mut tx)?;
        tx.commit()?;
        Ok(())
    }
}

impl GrantStore for Store {
    #[inline]
    fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Snapshot) -> Result<T>,
    {
        let txn = self.env.read_txn()?;
        f(&LmdbSnapshot::new(&self.dbs, &txn))
    }
}
