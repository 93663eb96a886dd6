//! Resource tree, subjects, grants and roles

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_COMPONENT_KEY_LEN, MAX_ROLE_LEN, MAX_UUID_LEN};
use crate::error::{invalid, PermtreeError, Result};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Reject the zero id, which no store ever assigns
            pub fn validate(self) -> Result<Self> {
                if self.0 == 0 {
                    Err(invalid(concat!(stringify!($name), " must be positive")))
                } else {
                    Ok(self)
                }
            }
        }

        impl From<u64> for $name {
            fn from(v: u64) -> Self {
                $name(v)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Internal numeric key of a component
    ComponentId
);
id_type!(UserId);
id_type!(GroupId);

/// Position of a component in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Scope {
    Project,
    Module,
    Directory,
    File,
}

impl Scope {
    pub(crate) fn code(self) -> u8 {
        match self {
            Scope::Project => b'P',
            Scope::Module => b'M',
            Scope::Directory => b'D',
            Scope::File => b'F',
        }
    }

    pub(crate) fn from_code(c: u8) -> Option<Self> {
        match c {
            b'P' => Some(Scope::Project),
            b'M' => Some(Scope::Module),
            b'D' => Some(Scope::Directory),
            b'F' => Some(Scope::File),
            _ => None,
        }
    }
}

/// A node of the resource tree. Roots have `root_id == id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub uuid: String,
    pub key: String,
    pub root_id: ComponentId,
    pub scope: Scope,
}

impl Component {
    /// A root component: its own tree top
    pub fn root(id: u64, uuid: &str, key: &str) -> Self {
        Component {
            id: ComponentId(id),
            uuid: uuid.to_string(),
            key: key.to_string(),
            root_id: ComponentId(id),
            scope: Scope::Project,
        }
    }

    /// A descendant of `root_id`
    pub fn child(id: u64, root_id: u64, uuid: &str, key: &str, scope: Scope) -> Self {
        Component {
            id: ComponentId(id),
            uuid: uuid.to_string(),
            key: key.to_string(),
            root_id: ComponentId(root_id),
            scope,
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.id == self.root_id
    }
}

pub(crate) fn validate_component_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(invalid("component key is empty"));
    }
    if key.len() > MAX_COMPONENT_KEY_LEN {
        return Err(invalid(format!("component key longer than {} bytes", MAX_COMPONENT_KEY_LEN)));
    }
    Ok(())
}

pub(crate) fn validate_uuid(uuid: &str) -> Result<()> {
    if uuid.is_empty() || uuid.len() > MAX_UUID_LEN {
        return Err(invalid(format!("uuid must be 1..={} bytes", MAX_UUID_LEN)));
    }
    Ok(())
}

/// Who is asking: a known user or nobody
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Anonymous,
    User(UserId),
}

impl From<Option<UserId>> for Subject {
    fn from(user: Option<UserId>) -> Self {
        user.map_or(Subject::Anonymous, Subject::User)
    }
}

impl From<UserId> for Subject {
    fn from(user: UserId) -> Self {
        Subject::User(user)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Anonymous => f.write_str("anonymous"),
            Subject::User(u) => write!(f, "user:{}", u),
        }
    }
}

/// Holder of a grant row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantSubject {
    User(UserId),
    Group(GroupId),
    /// Every subject, anonymous included
    Anyone,
}

/// Opaque permission label. Compared by equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Role(String);

impl Role {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("empty".to_string())
        } else if name.len() > MAX_ROLE_LEN {
            Some(format!("longer than {} bytes", MAX_ROLE_LEN))
        } else if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            Some("contains whitespace or control characters".to_string())
        } else {
            None
        };
        match reason {
            Some(reason) => Err(PermtreeError::InvalidRole { role: name, reason }),
            None => Ok(Role(name)),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Role {
    type Err = PermtreeError;
    fn from_str(s: &str) -> Result<Self> {
        Role::new(s)
    }
}

impl TryFrom<String> for Role {
    type Error = PermtreeError;
    fn try_from(s: String) -> Result<Self> {
        Role::new(s)
    }
}

impl From<Role> for String {
    fn from(r: Role) -> Self {
        r.0
    }
}

impl Borrow<str> for Role {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
