//! Grant store access: matching a subject against grant rows.
//!
//! A subject is expanded into the principals whose grants it inherits:
//! itself, each of its groups, and ANYONE. Anonymous expands to ANYONE
//! only, so no user or group row can ever match it.

use std::collections::{BTreeSet, HashSet};

use crate::error::Result;
use crate::model::{ComponentId, GrantSubject, Role, Subject};
use crate::store::Snapshot;

/// Every grant holder whose rows apply to `subject`
pub fn principals(snap: &dyn Snapshot, subject: Subject) -> Result<Vec<GrantSubject>> {
    match subject {
        Subject::Anonymous => Ok(vec![GrantSubject::Anyone]),
        Subject::User(user) => {
            let groups = snap.groups_of(user)?;
            let mut p = Vec::with_capacity(groups.len() + 2);
            p.push(GrantSubject::User(user));
            p.extend(groups.into_iter().map(GrantSubject::Group));
            p.push(GrantSubject::Anyone);
            Ok(p)
        }
    }
}

/// Roots named by a non-global grant of `role` held by any principal
pub fn authorized_roots(snap: &dyn Snapshot, principals: &[GrantSubject], role: &Role) -> Result<HashSet<ComponentId>> {
    let mut roots = HashSet::new();
    for &p in principals {
        roots.extend(snap.grants_of(p, Some(role))?.into_iter().filter_map(|g| g.target));
    }
    Ok(roots)
}

/// Whether any principal holds `role` globally
pub fn has_global_grant(snap: &dyn Snapshot, principals: &[GrantSubject], role: &Role) -> Result<bool> {
    for &p in principals {
        if snap.has_grant(p, role, None)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Whether any principal holds `role` on `root` specifically
pub fn has_root_grant(snap: &dyn Snapshot, principals: &[GrantSubject], role: &Role, root: ComponentId) -> Result<bool> {
    for &p in principals {
        if snap.has_grant(p, role, Some(root))? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Union of roles held globally by any principal
pub fn global_roles(snap: &dyn Snapshot, principals: &[GrantSubject]) -> Result<BTreeSet<Role>> {
    let mut roles = BTreeSet::new();
    for &p in principals {
        roles.extend(snap.grants_of(p, None)?.into_iter().filter(|g| g.target.is_none()).map(|g| g.role));
    }
    Ok(roles)
}
