//! # World Configuration
//!
//! Sizing knobs for a world. All fields have defaults, so a TOML file only
//! needs the keys it changes:
//!
//! ```toml
//! pool_chunk_len = 1024
//! entity_capacity = 50000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, EcsResult};
use crate::memory::DEFAULT_CHUNK_LEN;

/// Configuration for a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Slots per arena chunk in every component pool.
    pub pool_chunk_len: usize,
    /// Entity rows reserved up front.
    pub entity_capacity: usize,
    /// Mods reserved up front in the dispatcher's queue.
    pub mod_queue_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            pool_chunk_len: DEFAULT_CHUNK_LEN,
            entity_capacity: 0,
            mod_queue_capacity: 256,
        }
    }
}

impl WorldConfig {
    /// Small chunks and no reservation. Useful for tests and tools.
    #[must_use]
    pub const fn compact() -> Self {
        Self {
            pool_chunk_len: 64,
            entity_capacity: 0,
            mod_queue_capacity: 16,
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::Config`] if the document is malformed or invalid.
    pub fn from_toml_str(source: &str) -> EcsResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::Io`] if the file cannot be read, or
    /// [`EcsError::Config`] if its content is invalid.
    pub fn load(path: impl AsRef<Path>) -> EcsResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::Config`] if `pool_chunk_len` is zero.
    pub fn validate(&self) -> EcsResult<()> {
        if self.pool_chunk_len == 0 {
            return Err(EcsError::Config("pool_chunk_len must be greater than zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = WorldConfig::default();
        assert_eq!(config.pool_chunk_len, DEFAULT_CHUNK_LEN);
        assert!(config.validate().is_ok());
        assert!(WorldConfig::compact().validate().is_ok());
    }

    #[test]
    fn test_config_partial_toml() {
        let config = WorldConfig::from_toml_str("entity_capacity = 500\n").unwrap();
        assert_eq!(config.entity_capacity, 500);
        assert_eq!(config.pool_chunk_len, DEFAULT_CHUNK_LEN);
    }

    #[test]
    fn test_config_rejects_zero_chunk() {
        let err = WorldConfig::from_toml_str("pool_chunk_len = 0").unwrap_err();
        assert!(matches!(err, EcsError::Config(_)));
    }

    #[test]
    fn test_config_rejects_malformed() {
        let err = WorldConfig::from_toml_str("pool_chunk_len = \"many\"").unwrap_err();
        assert!(matches!(err, EcsError::Config(_)));
    }

    #[test]
    fn test_config_missing_file() {
        let err = WorldConfig::load("/nonexistent/tessera.toml").unwrap_err();
        assert!(matches!(err, EcsError::Io(_)));
    }
}
