//! Permission resolution engine
//!
//! Answers "which of these components may this subject see under this
//! role" against one store snapshot per call. A component is authorized
//! when a matching grant is global or targets the component's root, so a
//! root and its descendants go through the same predicate. The engine keeps
//! no state between calls.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use crate::config::Config;
use crate::constants::{DEADLINE_CHECK_INTERVAL, DEFAULT_CHUNK_SIZE, MAX_COMPONENT_KEY_LEN};
use crate::deadline::Deadline;
use crate::error::{invalid, PermtreeError, Result};
use crate::grants;
use crate::model::{Component, ComponentId, Role, Subject};
use crate::partition::{check_chunk_size, union_chunks};
use crate::store::{GrantStore, Snapshot};

/// Something a caller can ask about: a component key or a component id
pub trait Candidate: Clone + Eq + Hash + Debug {
    /// Reject malformed identifiers before any store access
    fn validate(&self) -> Result<()>;

    /// False when no stored component could carry this identifier; such
    /// candidates are dropped like unknown ones without a lookup
    fn may_exist(&self) -> bool {
        true
    }

    /// Root id of each known candidate in `chunk`
    fn resolve_roots(snap: &dyn Snapshot, chunk: &[Self]) -> Result<HashMap<Self, ComponentId>>;

    /// Root id of one candidate, `None` if unknown
    fn resolve_root(&self, snap: &dyn Snapshot) -> Result<Option<ComponentId>>;
}

impl Candidate for String {
    fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(invalid("component key is empty"));
        }
        Ok(())
    }

    fn may_exist(&self) -> bool {
        self.len() <= MAX_COMPONENT_KEY_LEN
    }

    fn resolve_roots(snap: &dyn Snapshot, chunk: &[Self]) -> Result<HashMap<Self, ComponentId>> {
        snap.root_ids_by_keys(chunk)
    }

    fn resolve_root(&self, snap: &dyn Snapshot) -> Result<Option<ComponentId>> {
        match snap.component_id_by_key(self)? {
            Some(id) => Ok(snap.component(id)?.map(|c| c.root_id)),
            None => Ok(None),
        }
    }
}

impl Candidate for ComponentId {
    fn validate(&self) -> Result<()> {
        ComponentId::validate(*self).map(|_| ())
    }

    fn resolve_roots(snap: &dyn Snapshot, chunk: &[Self]) -> Result<HashMap<Self, ComponentId>> {
        snap.root_ids_by_ids(chunk)
    }

    fn resolve_root(&self, snap: &dyn Snapshot) -> Result<Option<ComponentId>> {
        Ok(snap.component(*self)?.map(|c| c.root_id))
    }
}

/// Stateless resolver over a [`GrantStore`]
#[derive(Clone)]
pub struct Engine<S> {
    store: S,
    chunk_size: usize,
    deadline: Deadline,
}

impl<S: GrantStore> Engine<S> {
    pub fn new(store: S) -> Self {
        Engine { store, chunk_size: DEFAULT_CHUNK_SIZE, deadline: Deadline::none() }
    }

    pub fn with_config(store: S, config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Engine { store, chunk_size: config.chunk_size, deadline: Deadline::none() })
    }

    /// Override the number of identifiers sent per store query
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        check_chunk_size(chunk_size)?;
        self.chunk_size = chunk_size;
        Ok(self)
    }

    /// A copy of this engine whose calls fail once `deadline` passes
    pub fn with_deadline(&self, deadline: Deadline) -> Self
    where
        S: Clone,
    {
        Engine { store: self.store.clone(), chunk_size: self.chunk_size, deadline }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Keep the candidates `subject` may access under `role`.
    ///
    /// Unknown candidates are dropped, never reported as errors; so are keys
    /// too long for any component to carry. The result is a subset of the
    /// input; duplicates collapse, the first occurrence fixing chunk order.
    pub fn filter_authorized<C, I>(&self, candidates: I, subject: impl Into<Subject>, role: &str) -> Result<HashSet<C>>
    where
        C: Candidate,
        I: IntoIterator<Item = C>,
    {
        let subject = subject.into();
        let role = Role::new(role)?;
        // first occurrence wins, so the same input always yields the same chunks
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for c in candidates {
            c.validate()?;
            if c.may_exist() && seen.insert(c.clone()) {
                unique.push(c);
            }
        }
        if unique.is_empty() {
            return Ok(HashSet::new());
        }
        let candidates = unique;
        tracing::debug!(%subject, %role, candidates = candidates.len(), chunk_size = self.chunk_size, "filter_authorized");

        let result = self.store.read(|snap| {
            self.deadline.check()?;
            let principals = grants::principals(snap, subject)?;
            let global = grants::has_global_grant(snap, &principals, &role)?;
            let roots = if global { HashSet::new() } else { grants::authorized_roots(snap, &principals, &role)? };
            if !global && roots.is_empty() {
                return Ok(HashSet::new());
            }
            union_chunks(&candidates, self.chunk_size, &self.deadline, |chunk| {
                let kept: Vec<C> = C::resolve_roots(snap, chunk)?
                    .into_iter()
                    .filter(|(_, root)| global || roots.contains(root))
                    .map(|(c, _)| c)
                    .collect();
                Ok(kept)
            })
        });
        self.finish("filter_authorized", result, |r| r.len())
    }

    /// Single-candidate form of [`Engine::filter_authorized`]
    pub fn is_authorized<C: Candidate>(&self, candidate: C, subject: impl Into<Subject>, role: &str) -> Result<bool> {
        let subject = subject.into();
        let role = Role::new(role)?;
        candidate.validate()?;
        if !candidate.may_exist() {
            return Ok(false);
        }
        let result = self.store.read(|snap| {
            self.deadline.check()?;
            let Some(root) = candidate.resolve_root(snap)? else {
                return Ok(false);
            };
            let principals = grants::principals(snap, subject)?;
            Ok(grants::has_global_grant(snap, &principals, &role)?
                || grants::has_root_grant(snap, &principals, &role, root)?)
        });
        tracing::debug!(%subject, %role, ?candidate, allowed = ?result.as_ref().ok(), "is_authorized");
        self.finish("is_authorized", result, |_| 1)
    }

    /// Keys of every root component authorized for `subject` under `role`
    pub fn authorized_root_keys(&self, subject: impl Into<Subject>, role: &str) -> Result<HashSet<String>> {
        self.authorized_roots_projected(subject.into(), role, |c| c.key)
    }

    /// Uuids of every root component authorized for `subject` under `role`
    pub fn authorized_root_uuids(&self, subject: impl Into<Subject>, role: &str) -> Result<HashSet<String>> {
        self.authorized_roots_projected(subject.into(), role, |c| c.uuid)
    }

    fn authorized_roots_projected(&self, subject: Subject, role: &str, project: fn(Component) -> String) -> Result<HashSet<String>> {
        let role = Role::new(role)?;
        let result = self.store.read(|snap| {
            self.deadline.check()?;
            let principals = grants::principals(snap, subject)?;
            let mut out = HashSet::new();
            // A global grant covers every root, which includes every root
            // that also has an explicit row.
            if grants::has_global_grant(snap, &principals, &role)? {
                for (n, c) in snap.root_components()?.into_iter().enumerate() {
                    if n % DEADLINE_CHECK_INTERVAL == 0 {
                        self.deadline.check()?;
                    }
                    out.insert(project(c));
                }
                return Ok(out);
            }
            for (n, root) in grants::authorized_roots(snap, &principals, &role)?.into_iter().enumerate() {
                if n % DEADLINE_CHECK_INTERVAL == 0 {
                    self.deadline.check()?;
                }
                match snap.component(root)? {
                    Some(c) if c.is_root() => {
                        out.insert(project(c));
                    }
                    _ => tracing::warn!(%root, %role, "grant targets a missing or non-root component"),
                }
            }
            Ok(out)
        });
        tracing::debug!(%subject, %role, "authorized_roots");
        self.finish("authorized_roots", result, |r| r.len())
    }

    /// Roles `subject` holds on the whole tree
    pub fn global_roles(&self, subject: impl Into<Subject>) -> Result<BTreeSet<Role>> {
        let subject = subject.into();
        let result = self.store.read(|snap| {
            self.deadline.check()?;
            grants::global_roles(snap, &grants::principals(snap, subject)?)
        });
        tracing::debug!(%subject, "global_roles");
        self.finish("global_roles", result, |r| r.len())
    }

    /// [`Engine::global_roles`] for a login. `None` is anonymous; a login
    /// naming no user holds nothing, not even ANYONE roles.
    pub fn global_roles_for_login(&self, login: Option<&str>) -> Result<BTreeSet<Role>> {
        if login.is_some_and(str::is_empty) {
            return Err(invalid("login is empty"));
        }
        let result = self.store.read(|snap| {
            self.deadline.check()?;
            let subject = match login {
                Some(login) => match snap.user_by_login(login)? {
                    Some(user) => Subject::User(user),
                    None => return Ok(BTreeSet::new()),
                },
                None => Subject::Anonymous,
            };
            grants::global_roles(snap, &grants::principals(snap, subject)?)
        });
        tracing::debug!(login = login.unwrap_or("<anonymous>"), "global_roles_for_login");
        self.finish("global_roles_for_login", result, |r| r.len())
    }

    fn finish<T>(&self, op: &'static str, result: Result<T>, size: impl FnOnce(&T) -> usize) -> Result<T> {
        match &result {
            Ok(r) => tracing::debug!(op, size = size(r), "resolved"),
            Err(e @ (PermtreeError::Cancelled | PermtreeError::DeadlineExceeded { .. })) => {
                tracing::warn!(op, error = %e, "resolution aborted")
            }
            Err(e) => tracing::debug!(op, error = %e, "resolution failed"),
        }
        result
    }
}
