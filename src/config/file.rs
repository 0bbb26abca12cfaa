//! File-backed configuration source
//!
//! Layers a TOML configuration file with `SLUICE_`-prefixed environment
//! overrides through figment, the same way the embedding tools of this crate
//! layer their own configuration. Keys are dotted paths resolved against the
//! merged figure, so `[core] eol = "lf"` answers a lookup of `core.eol`.

use std::path::Path;

use figment::providers::{Env, Format, Toml};
use figment::value::Value;
use figment::{Figment, error::Kind};

use super::{ConfigError, ConfigSource, ConfigValue};

/// Environment variable prefix for overrides, e.g. `SLUICE_CORE_EOL=lf`.
const ENV_PREFIX: &str = "SLUICE_";

/// Repository configuration read from a TOML file plus the environment.
///
/// A missing file is not an error: every lookup then reports not-found and
/// the defaults stand, matching how an absent repository config behaves.
/// Malformed content surfaces as [`ConfigError::Source`] on the first
/// lookup, leaving the caller free to retry after fixing the file.
#[derive(Debug, Clone)]
pub struct FileConfig {
    figment: Figment,
}

impl FileConfig {
    /// Opens the configuration at `path`, merged with environment overrides.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        // SLUICE_CORE_AUTO_CRLF must become core.auto_crlf, so only the
        // first underscore separates the section from the key name.
        let env = Env::prefixed(ENV_PREFIX)
            .map(|key| key.as_str().replacen('_', ".", 1).into())
            .split(".");

        let figment = Figment::new().merge(Toml::file(path)).merge(env);

        Self { figment }
    }

    /// Wraps an already-built figment, for embedders with their own layering.
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }
}

impl ConfigSource for FileConfig {
    fn get(&self, key: &str) -> Result<Option<ConfigValue>, ConfigError> {
        match self.figment.find_value(key) {
            Ok(Value::Bool(_, value)) => Ok(Some(ConfigValue::Bool(value))),
            Ok(Value::String(_, value)) => Ok(Some(ConfigValue::Str(value))),
            Ok(other) => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: format!("{other:?}"),
            }),
            Err(error) if matches!(error.kind, Kind::MissingField(_)) => Ok(None),
            Err(error) => Err(ConfigError::Source(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reads_strings_and_booleans() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[core]\neol = \"crlf\"\nauto_crlf = true\n").unwrap();

        let config = FileConfig::open(&path);
        assert_eq!(
            config.get("core.eol").unwrap(),
            Some(ConfigValue::Str("crlf".to_string()))
        );
        assert_eq!(
            config.get("core.auto_crlf").unwrap(),
            Some(ConfigValue::Bool(true))
        );
    }

    #[test]
    fn absent_key_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[core]\neol = \"lf\"\n").unwrap();

        let config = FileConfig::open(&path);
        assert_eq!(config.get("core.auto_crlf").unwrap(), None);
    }

    #[test]
    fn missing_file_behaves_like_empty_config() {
        let dir = TempDir::new().unwrap();
        let config = FileConfig::open(dir.path().join("nope.toml"));
        assert_eq!(config.get("core.eol").unwrap(), None);
    }

    #[test]
    fn malformed_file_is_a_source_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[core\neol = ").unwrap();

        let config = FileConfig::open(&path);
        let err = config.get("core.eol").unwrap_err();
        assert!(matches!(err, ConfigError::Source(_)));
    }
}
