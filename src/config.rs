//! Store and engine configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_MAP_SIZE, DEFAULT_MAX_READERS, MAX_CHUNK_SIZE};
use crate::error::{PermtreeError, Result};

/// Tunables for the LMDB store and the resolution engine.
///
/// Every field has a default, so an empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// LMDB map size in bytes
    pub map_size: usize,
    /// Maximum read transactions open at the same instant. A slot is held
    /// only for the duration of one engine call, not per thread, so this
    /// bounds in-flight calls; a call beyond it fails with a storage error.
    pub max_readers: u32,
    /// Identifiers per batched store query
    pub chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_size: DEFAULT_MAP_SIZE,
            max_readers: DEFAULT_MAX_READERS,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text).map_err(|e| match e {
            PermtreeError::Yaml(e) => PermtreeError::Config {
                reason: format!("{}: {}", path.display(), e),
            },
            other => other,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(PermtreeError::Config {
                reason: format!("chunk_size must be in 1..={}, got {}", MAX_CHUNK_SIZE, self.chunk_size),
            });
        }
        if self.map_size < 1 << 20 {
            return Err(PermtreeError::Config {
                reason: format!("map_size must be at least 1 MiB, got {}", self.map_size),
            });
        }
        if self.max_readers == 0 {
            return Err(PermtreeError::Config { reason: "max_readers must be positive".into() });
        }
        Ok(())
    }
}
