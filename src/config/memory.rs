//! In-memory configuration source for tests and embedders

use std::collections::HashMap;

use super::{ConfigError, ConfigSource, ConfigValue};

/// Configuration entries held in a plain map.
///
/// Useful when the embedding application already resolved its configuration
/// elsewhere, and throughout the test suite. Lookups never fail.
#[derive(Debug, Default, Clone)]
pub struct MemoryConfig {
    entries: HashMap<String, ConfigValue>,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing any previous entry.
    pub fn set(&mut self, key: &str, value: impl Into<ConfigValue>) -> &mut Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }

    /// Removes `key`, so later lookups report not-found.
    pub fn unset(&mut self, key: &str) -> &mut Self {
        self.entries.remove(key);
        self
    }
}

impl ConfigSource for MemoryConfig {
    fn get(&self, key: &str) -> Result<Option<ConfigValue>, ConfigError> {
        Ok(self.entries.get(key).cloned())
    }
}
