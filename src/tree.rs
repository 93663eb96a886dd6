//! Component lookups over the resource tree

use crate::constants::DEFAULT_CHUNK_SIZE;
use crate::deadline::Deadline;
use crate::error::{PermtreeError, Result};
use crate::model::{validate_component_key, validate_uuid, Component, ComponentId, Scope};
use crate::partition::{check_chunk_size, union_chunks};
use crate::store::{GrantStore, Snapshot};

fn not_found(kind: &'static str, reference: impl ToString) -> PermtreeError {
    PermtreeError::NotFound { kind, reference: reference.to_string() }
}

/// Read-only view of the component tree held by a store
#[derive(Clone)]
pub struct ResourceTree<S> {
    store: S,
    chunk_size: usize,
}

impl<S: GrantStore> ResourceTree<S> {
    pub fn new(store: S) -> Self {
        ResourceTree { store, chunk_size: DEFAULT_CHUNK_SIZE }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        check_chunk_size(chunk_size)?;
        self.chunk_size = chunk_size;
        Ok(self)
    }

    pub fn find_component_by_id(&self, id: ComponentId) -> Result<Option<Component>> {
        self.store.read(|snap| snap.component(id))
    }

    pub fn component_by_id(&self, id: ComponentId) -> Result<Component> {
        self.find_component_by_id(id)?.ok_or_else(|| not_found("component", id))
    }

    pub fn exists(&self, id: ComponentId) -> Result<bool> {
        Ok(self.find_component_by_id(id)?.is_some())
    }

    pub fn find_component_by_uuid(&self, uuid: &str) -> Result<Option<Component>> {
        validate_uuid(uuid)?;
        self.store.read(|snap| by_uuid(snap, uuid))
    }

    pub fn component_by_uuid(&self, uuid: &str) -> Result<Component> {
        self.find_component_by_uuid(uuid)?.ok_or_else(|| not_found("component uuid", uuid))
    }

    pub fn find_component_by_key(&self, key: &str) -> Result<Option<Component>> {
        validate_component_key(key)?;
        self.store.read(|snap| by_key(snap, key))
    }

    pub fn component_by_key(&self, key: &str) -> Result<Component> {
        self.find_component_by_key(key)?.ok_or_else(|| not_found("component key", key))
    }

    /// Root of the tree `key` belongs to; a root returns itself
    pub fn find_root_component_by_key(&self, key: &str) -> Result<Option<Component>> {
        validate_component_key(key)?;
        self.store.read(|snap| match by_key(snap, key)? {
            Some(c) if c.is_root() => Ok(Some(c)),
            Some(c) => snap.component(c.root_id),
            None => Ok(None),
        })
    }

    pub fn root_component_by_key(&self, key: &str) -> Result<Component> {
        self.find_root_component_by_key(key)?
            .ok_or_else(|| not_found("root component for key", key))
    }

    /// Known components among `uuids`, sorted by id. Unknown uuids are skipped.
    pub fn components_by_uuids<I, U>(&self, uuids: I) -> Result<Vec<Component>>
    where
        I: IntoIterator<Item = U>,
        U: AsRef<str>,
    {
        let uuids: Vec<String> = uuids.into_iter().map(|u| u.as_ref().to_string()).collect();
        for uuid in &uuids {
            validate_uuid(uuid)?;
        }
        if uuids.is_empty() {
            return Ok(Vec::new());
        }
        let found = self.store.read(|snap| {
            union_chunks(&uuids, self.chunk_size, &Deadline::none(), |chunk| {
                let mut r = Vec::with_capacity(chunk.len());
                for uuid in chunk {
                    if let Some(c) = by_uuid(snap, uuid)? {
                        r.push(c);
                    }
                }
                Ok(r)
            })
        })?;
        let mut found: Vec<Component> = found.into_iter().collect();
        found.sort_by_key(|c| c.id);
        Ok(found)
    }

    /// Modules of the project owning `project_key`, sorted by key
    pub fn modules_of_project(&self, project_key: &str) -> Result<Vec<Component>> {
        validate_component_key(project_key)?;
        self.store.read(|snap| {
            let project = by_key(snap, project_key)?.ok_or_else(|| not_found("component key", project_key))?;
            let mut modules: Vec<Component> = snap
                .components_under(project.root_id)?
                .into_iter()
                .filter(|c| c.scope == Scope::Module)
                .collect();
            modules.sort_by(|a, b| a.key.cmp(&b.key));
            Ok(modules)
        })
    }

    /// Uuids of every root component, sorted
    pub fn root_uuids(&self) -> Result<Vec<String>> {
        let mut uuids: Vec<String> = self
            .store
            .read(|snap| snap.root_components())?
            .into_iter()
            .map(|c| c.uuid)
            .collect();
        uuids.sort();
        Ok(uuids)
    }
}

fn by_key(snap: &dyn Snapshot, key: &str) -> Result<Option<Component>> {
    match snap.component_id_by_key(key)? {
        Some(id) => snap.component(id),
        None => Ok(None),
    }
}

fn by_uuid(snap: &dyn Snapshot, uuid: &str) -> Result<Option<Component>> {
    match snap.component_id_by_uuid(uuid)? {
        Some(id) => snap.component(id),
        None => Ok(None),
    }
}
