//! Runtime configuration
//!
//! Limits for nested evaluation. Values come from [`RuntimeConfig::default`],
//! builder-style setters, or an `ember.toml` file:
//!
//! ```toml
//! recursion_limit = 2000
//! stack_red_zone = 131072
//! stack_grow_size = 4194304
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default maximum evaluation depth
pub const DEFAULT_RECURSION_LIMIT: usize = 10_000;

/// Remaining stack below which the evaluator grows the stack (128KB)
pub const DEFAULT_STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each stack extension (4MB)
pub const DEFAULT_STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub recursion_limit: usize,
    pub stack_red_zone: usize,
    pub stack_grow_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            stack_red_zone: DEFAULT_STACK_RED_ZONE,
            stack_grow_size: DEFAULT_STACK_GROW_SIZE,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn stack_red_zone(mut self, bytes: usize) -> Self {
        self.stack_red_zone = bytes;
        self
    }

    pub fn stack_grow_size(mut self, bytes: usize) -> Self {
        self.stack_grow_size = bytes;
        self
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: RuntimeConfig =
            toml::from_str(text).map_err(|e| Error::value(format!("invalid config: {e}")))?;
        if config.recursion_limit == 0 {
            return Err(Error::value("invalid config: recursion_limit must be positive"));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.recursion_limit, DEFAULT_RECURSION_LIMIT);
        assert_eq!(config.stack_grow_size, 4 * 1024 * 1024);
    }

    #[test]
    fn test_builder() {
        let config = RuntimeConfig::new().recursion_limit(50).stack_red_zone(64 * 1024);
        assert_eq!(config.recursion_limit, 50);
        assert_eq!(config.stack_red_zone, 64 * 1024);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str("recursion_limit = 200").unwrap();
        assert_eq!(config.recursion_limit, 200);
        assert_eq!(config.stack_red_zone, DEFAULT_STACK_RED_ZONE);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = RuntimeConfig::from_toml_str("recursion = 3").unwrap_err();
        assert!(err.message.contains("invalid config"));
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert!(RuntimeConfig::from_toml_str("recursion_limit = 0").is_err());
    }
}
