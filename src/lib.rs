//! permtree - hierarchical permission resolution over root-scoped grants
//!
//! Components (projects, modules, directories, files) each point at the
//! root of their tree. Grants give a role to a user, a group or ANYONE,
//! either on one root or globally. The [`Engine`] answers which components
//! a subject may access, which roots it may access and which roles it
//! holds globally, always against a single consistent store snapshot.
//!
//! ```no_run
//! use permtree::{Config, Engine, Store, UserId};
//!
//! # fn main() -> permtree::Result<()> {
//! let store = Store::open("/var/lib/permtree", &Config::default())?;
//! let engine = Engine::new(store);
//! let visible = engine.filter_authorized(
//!     vec!["project:src/Main.java".to_string()],
//!     Some(UserId(100)),
//!     "user",
//! )?;
//! # let _ = visible;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod db;
pub mod deadline;
pub mod engine;
pub mod error;
pub mod grants;
pub mod keys;
pub mod model;
pub mod partition;
mod read;
pub mod store;
pub mod tree;
pub mod tx;

pub use config::Config;
pub use constants::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use db::Store;
pub use deadline::{CancelToken, Deadline};
pub use engine::{Candidate, Engine};
pub use error::{PermtreeError, Result};
pub use model::{Component, ComponentId, GrantSubject, GroupId, Role, Scope, Subject, UserId};
pub use partition::{partition, union_chunks};
pub use store::{GrantRow, GrantStore, Snapshot};
pub use tree::ResourceTree;
pub use tx::Tx;
