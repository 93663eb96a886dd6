//! Length-prefixed key encoding for LMDB storage.
//!
//! Keys and records are encoded as: [len1][bytes1][len2][bytes2]...
//! - lengths are big-endian u16, so any segment content is allowed
//! - a shorter key is a byte prefix of every longer key sharing its
//!   leading segments, which is what the grant scans rely on
//! - integer segments are big-endian so ids sort numerically

use crate::constants::{TAG_ANYONE, TAG_GROUP, TAG_USER};
use crate::error::{corrupt, Result};
use crate::model::{Component, ComponentId, GrantSubject, GroupId, Role, Scope, UserId};

/// Build a length-prefixed key from parts
#[inline]
pub fn build_key(parts: &[&[u8]]) -> Vec<u8> {
    let total_len: usize = parts.iter().map(|p| 2 + p.len()).sum();
    let mut key = Vec::with_capacity(total_len);
    for part in parts {
        key.extend_from_slice(&(part.len() as u16).to_be_bytes());
        key.extend_from_slice(part);
    }
    key
}

/// Parse a length-prefixed key into parts. `None` if truncated.
pub fn parse_key(bytes: &[u8]) -> Option<Vec<&[u8]>> {
    let mut parts = Vec::with_capacity(4);
    let mut i = 0;
    while i < bytes.len() {
        let len_bytes = bytes.get(i..i + 2)?;
        let len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
        parts.push(bytes.get(i + 2..i + 2 + len)?);
        i += 2 + len;
    }
    Some(parts)
}

/// 16-byte key from two u64 values (membership pairs)
#[inline]
pub fn pair_key(a: u64, b: u64) -> [u8; 16] {
    let mut k = [0u8; 16];
    k[..8].copy_from_slice(&a.to_be_bytes());
    k[8..].copy_from_slice(&b.to_be_bytes());
    k
}

pub(crate) fn read_u64(part: &[u8]) -> Option<u64> {
    Some(u64::from_be_bytes(part.try_into().ok()?))
}

// ============================================================================
// Grant keys: [tag][subject id][role][target]
// ============================================================================

fn subject_parts(subject: GrantSubject) -> (u8, u64) {
    match subject {
        GrantSubject::User(UserId(u)) => (TAG_USER, u),
        GrantSubject::Group(GroupId(g)) => (TAG_GROUP, g),
        GrantSubject::Anyone => (TAG_ANYONE, 0),
    }
}

/// Prefix covering every grant row of a subject
pub fn subject_prefix(subject: GrantSubject) -> Vec<u8> {
    let (tag, id) = subject_parts(subject);
    build_key(&[&[tag], &id.to_be_bytes()])
}

/// Prefix covering every grant row of a subject for one role
pub fn role_prefix(subject: GrantSubject, role: &Role) -> Vec<u8> {
    let (tag, id) = subject_parts(subject);
    build_key(&[&[tag], &id.to_be_bytes(), role.as_str().as_bytes()])
}

/// Full grant key. Global grants carry an empty target segment.
pub fn grant_key(subject: GrantSubject, role: &Role, target: Option<ComponentId>) -> Vec<u8> {
    let (tag, id) = subject_parts(subject);
    let target = target.map(|t| t.0.to_be_bytes());
    let target: &[u8] = match &target {
        Some(t) => t,
        None => &[],
    };
    build_key(&[&[tag], &id.to_be_bytes(), role.as_str().as_bytes(), target])
}

/// Decode a grant key back into (role, target)
pub fn parse_grant_key(bytes: &[u8]) -> Result<(Role, Option<ComponentId>)> {
    let parts = parse_key(bytes).ok_or_else(|| corrupt("truncated grant key"))?;
    let [_, _, role, target] = parts.as_slice() else {
        return Err(corrupt(format!("grant key has {} segments", parts.len())));
    };
    let role = std::str::from_utf8(role).map_err(|_| corrupt("grant role is not utf-8"))?;
    let role = Role::new(role).map_err(|e| corrupt(e.to_string()))?;
    let target = match target.len() {
        0 => None,
        _ => Some(ComponentId(read_u64(target).ok_or_else(|| corrupt("bad grant target"))?)),
    };
    Ok((role, target))
}

// ============================================================================
// Component records: [root id][scope][key][uuid]
// ============================================================================

pub fn encode_component(c: &Component) -> Vec<u8> {
    build_key(&[
        &c.root_id.0.to_be_bytes(),
        &[c.scope.code()],
        c.key.as_bytes(),
        c.uuid.as_bytes(),
    ])
}

pub fn decode_component(id: ComponentId, bytes: &[u8]) -> Result<Component> {
    let bad = || corrupt(format!("component record {}", id));
    let parts = parse_key(bytes).ok_or_else(bad)?;
    let [root, scope, key, uuid] = parts.as_slice() else {
        return Err(bad());
    };
    Ok(Component {
        id,
        root_id: ComponentId(read_u64(root).ok_or_else(bad)?),
        scope: scope.first().copied().and_then(Scope::from_code).ok_or_else(bad)?,
        key: String::from_utf8(key.to_vec()).map_err(|_| bad())?,
        uuid: String::from_utf8(uuid.to_vec()).map_err(|_| bad())?,
    })
}

/// Root id of an encoded record, without decoding the strings
pub fn record_root_id(bytes: &[u8]) -> Option<ComponentId> {
    let len = u16::from_be_bytes([*bytes.first()?, *bytes.get(1)?]) as usize;
    if len != 8 {
        return None;
    }
    read_u64(bytes.get(2..10)?).map(ComponentId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_parse() {
        let key = build_key(&[b"user".as_slice(), b"", b"root"]);
        let parts = parse_key(&key).unwrap();
        assert_eq!(parts, vec![&b"user"[..], &b""[..], &b"root"[..]]);
        assert!(parse_key(&key[..key.len() - 1]).is_none());
    }

    #[test]
    fn test_grant_prefixes() {
        let role = Role::new("user").unwrap();
        let subject = GrantSubject::Group(GroupId(7));
        let key = grant_key(subject, &role, Some(ComponentId(300)));
        assert!(key.starts_with(&subject_prefix(subject)));
        assert!(key.starts_with(&role_prefix(subject, &role)));

        // a longer role sharing a textual prefix is not matched
        let users = Role::new("users").unwrap();
        assert!(!grant_key(subject, &users, None).starts_with(&role_prefix(subject, &role)));
        assert!(!key.starts_with(&subject_prefix(GrantSubject::Group(GroupId(8)))));
        assert!(!key.starts_with(&subject_prefix(GrantSubject::User(UserId(7)))));
    }

    #[test]
    fn test_parse_grant_key() {
        let role = Role::new("admin").unwrap();
        let global = grant_key(GrantSubject::Anyone, &role, None);
        assert_eq!(parse_grant_key(&global).unwrap(), (role.clone(), None));

        let targeted = grant_key(GrantSubject::User(UserId(1)), &role, Some(ComponentId(42)));
        assert_eq!(parse_grant_key(&targeted).unwrap(), (role, Some(ComponentId(42))));
        assert!(parse_grant_key(&build_key(&[b"a".as_slice()])).is_err());
    }

    #[test]
    fn test_component_record() {
        let c = Component::child(5, 3, "UUID-5", "proj:src/a.rs", Scope::File);
        let rec = encode_component(&c);
        assert_eq!(record_root_id(&rec), Some(ComponentId(3)));
        assert_eq!(decode_component(ComponentId(5), &rec).unwrap(), c);
        assert!(decode_component(ComponentId(5), &rec[..4]).is_err());
    }

    #[test]
    fn test_pair_key_orders_by_first() {
        assert!(pair_key(1, u64::MAX) < pair_key(2, 0));
        assert_eq!(&pair_key(9, 4)[..8], &9u64.to_be_bytes());
    }
}
