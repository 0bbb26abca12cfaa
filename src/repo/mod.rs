//! Repository handle owning the filter configuration
//!
//! A [`Repository`] ties a configuration source to the per-repository
//! [`FilterSettings`] cache. The handle is single-threaded; sharing one
//! across threads requires an external lock, as the settings load is a
//! check-then-set sequence.

use std::path::Path;

use crate::config::{ConfigError, ConfigSource, FileConfig};
use crate::settings::FilterSettings;

/// A repository as seen by the filter pipeline: configuration plus the
/// cached line-ending policies.
pub struct Repository {
    config: Box<dyn ConfigSource>,
    filter_settings: FilterSettings,
}

impl Repository {
    /// Opens the repository rooted at `path`, reading `config.toml` inside
    /// it. A missing file leaves every setting at its default.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let config = FileConfig::open(path.as_ref().join("config.toml"));
        Self::with_config(Box::new(config))
    }

    /// Wraps an already-resolved configuration source.
    pub fn with_config(config: Box<dyn ConfigSource>) -> Self {
        Self {
            config,
            filter_settings: FilterSettings::new(),
        }
    }

    /// The configuration source scoped to this repository.
    pub fn config(&self) -> &dyn ConfigSource {
        self.config.as_ref()
    }

    /// Ensures the settings cache is loaded, then hands back a copy.
    ///
    /// The first successful call queries the configuration store; later
    /// calls return the cached values without touching it.
    pub fn filter_settings(&mut self) -> Result<FilterSettings, ConfigError> {
        self.filter_settings.ensure_loaded(self.config.as_ref())?;
        Ok(self.filter_settings)
    }
}
