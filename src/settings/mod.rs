//! Cached per-repository line-ending policies
//!
//! Filter construction consults two settings, `core.eol` and
//! `core.auto_crlf`. They are read from the repository configuration at most
//! once and cached for the lifetime of the repository handle; later
//! configuration edits are deliberately not picked up.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigError, ConfigMap, ConfigSource, lookup_mapped};

/// Configured line-ending normalization mode (`core.eol`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EolPolicy {
    /// No explicit policy configured.
    #[default]
    Unset,
    /// Force LF line endings.
    Lf,
    /// Force CRLF line endings.
    Crlf,
    /// Use the platform's native line endings.
    Native,
}

/// Configured automatic CRLF conversion mode (`core.auto_crlf`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoCrlfPolicy {
    /// No automatic conversion.
    #[default]
    False,
    /// Convert in both transfer directions.
    True,
    /// Convert only on the way into storage.
    Input,
}

const EOL_MAP: &[ConfigMap<EolPolicy>] = &[
    ConfigMap::False(EolPolicy::Unset),
    ConfigMap::Str("lf", EolPolicy::Lf),
    ConfigMap::Str("crlf", EolPolicy::Crlf),
    ConfigMap::Str("native", EolPolicy::Native),
];

const AUTO_CRLF_MAP: &[ConfigMap<AutoCrlfPolicy>] = &[
    ConfigMap::False(AutoCrlfPolicy::False),
    ConfigMap::True(AutoCrlfPolicy::True),
    ConfigMap::Str("input", AutoCrlfPolicy::Input),
];

/// Load-once cache of the line-ending policies.
///
/// Lives on the repository handle. After a successful [`ensure_loaded`] the
/// cached values are authoritative for the rest of the handle's lifetime.
/// The handle itself is single-threaded; sharing one across threads requires
/// an external lock around the load.
///
/// [`ensure_loaded`]: FilterSettings::ensure_loaded
#[derive(Debug, Default, Clone, Copy)]
pub struct FilterSettings {
    pub eol: EolPolicy,
    pub auto_crlf: AutoCrlfPolicy,
    loaded: bool,
}

impl FilterSettings {
    pub const fn new() -> Self {
        Self {
            eol: EolPolicy::Unset,
            auto_crlf: AutoCrlfPolicy::False,
            loaded: false,
        }
    }

    /// Whether the cache has been populated from configuration.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Populates the cache from `config` unless already loaded.
    ///
    /// Missing keys keep their documented defaults (`Unset`, `False`). Any
    /// other configuration failure propagates and leaves the cache
    /// unloaded, so a later call retries the store.
    pub fn ensure_loaded(&mut self, config: &dyn ConfigSource) -> Result<(), ConfigError> {
        if self.loaded {
            return Ok(());
        }

        self.eol = EolPolicy::default();
        self.auto_crlf = AutoCrlfPolicy::default();

        if let Some(eol) = lookup_mapped(config, "core.eol", EOL_MAP)? {
            self.eol = eol;
        }
        if let Some(auto_crlf) = lookup_mapped(config, "core.auto_crlf", AUTO_CRLF_MAP)? {
            self.auto_crlf = auto_crlf;
        }

        self.loaded = true;
        debug!(eol = ?self.eol, auto_crlf = ?self.auto_crlf, "filter settings loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValue, MemoryConfig};
    use std::cell::Cell;

    /// Counts lookups so tests can observe load-once behavior.
    struct CountingConfig {
        inner: MemoryConfig,
        lookups: Cell<usize>,
    }

    impl ConfigSource for CountingConfig {
        fn get(&self, key: &str) -> Result<Option<ConfigValue>, ConfigError> {
            self.lookups.set(self.lookups.get() + 1);
            self.inner.get(key)
        }
    }

    /// Fails every lookup until told otherwise.
    struct FlakyConfig {
        healthy: Cell<bool>,
    }

    impl ConfigSource for FlakyConfig {
        fn get(&self, _key: &str) -> Result<Option<ConfigValue>, ConfigError> {
            if self.healthy.get() {
                Ok(None)
            } else {
                Err(ConfigError::Source(figment::Error::from(
                    "backing store offline".to_string(),
                )))
            }
        }
    }

    #[test]
    fn unset_config_keeps_defaults() {
        let config = MemoryConfig::new();
        let mut settings = FilterSettings::new();
        settings.ensure_loaded(&config).unwrap();

        assert!(settings.is_loaded());
        assert_eq!(settings.eol, EolPolicy::Unset);
        assert_eq!(settings.auto_crlf, AutoCrlfPolicy::False);
    }

    #[test]
    fn configured_values_map_to_policies() {
        let mut config = MemoryConfig::new();
        config.set("core.eol", "crlf").set("core.auto_crlf", "input");

        let mut settings = FilterSettings::new();
        settings.ensure_loaded(&config).unwrap();

        assert_eq!(settings.eol, EolPolicy::Crlf);
        assert_eq!(settings.auto_crlf, AutoCrlfPolicy::Input);
    }

    #[test]
    fn boolean_false_maps_to_unset_and_off() {
        let mut config = MemoryConfig::new();
        config.set("core.eol", false).set("core.auto_crlf", false);

        let mut settings = FilterSettings::new();
        settings.ensure_loaded(&config).unwrap();

        assert_eq!(settings.eol, EolPolicy::Unset);
        assert_eq!(settings.auto_crlf, AutoCrlfPolicy::False);
    }

    #[test]
    fn load_is_once_per_handle() {
        let mut inner = MemoryConfig::new();
        inner.set("core.eol", "lf");
        let config = CountingConfig {
            inner,
            lookups: Cell::new(0),
        };

        let mut settings = FilterSettings::new();
        settings.ensure_loaded(&config).unwrap();
        let after_first = config.lookups.get();
        assert_eq!(after_first, 2);

        settings.ensure_loaded(&config).unwrap();
        assert_eq!(config.lookups.get(), after_first);
        assert_eq!(settings.eol, EolPolicy::Lf);
    }

    #[test]
    fn hard_error_leaves_cache_retryable() {
        let config = FlakyConfig {
            healthy: Cell::new(false),
        };

        let mut settings = FilterSettings::new();
        assert!(settings.ensure_loaded(&config).is_err());
        assert!(!settings.is_loaded());

        config.healthy.set(true);
        settings.ensure_loaded(&config).unwrap();
        assert!(settings.is_loaded());
    }

    #[test]
    fn unmapped_value_propagates() {
        let mut config = MemoryConfig::new();
        config.set("core.eol", "mixed");

        let mut settings = FilterSettings::new();
        let err = settings.ensure_loaded(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(!settings.is_loaded());
    }
}
