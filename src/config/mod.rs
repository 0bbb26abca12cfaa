//! Repository configuration access for the filter pipeline
//!
//! The pipeline reads a small number of per-repository settings
//! (`core.eol`, `core.auto_crlf`) through the [`ConfigSource`] trait and
//! resolves raw values into policy enums via ordered mapping tables. Two
//! sources ship with the crate: an in-memory map for tests and embedders,
//! and a figment-backed file source merging a TOML file with environment
//! overrides.

mod file;
mod memory;

pub use file::FileConfig;
pub use memory::MemoryConfig;

use std::fmt;

use thiserror::Error;

/// Errors from a configuration source.
///
/// A missing key is not an error; sources report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The underlying store failed (unreadable file, malformed syntax, ...).
    #[error("configuration source failed: {0}")]
    Source(#[from] figment::Error),

    /// A value was present but matched no entry of its mapping table.
    #[error("unsupported value for `{key}`: {value}")]
    InvalidValue { key: String, value: String },
}

/// A raw configuration value before policy mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Bool(bool),
    Str(String),
}

impl ConfigValue {
    /// Boolean coercion with git's string spellings.
    ///
    /// `"yes"`, `"on"` and `"1"` read as true; `"no"`, `"off"` and `"0"`
    /// as false. Strings that spell neither return `None`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Str(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            },
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// A store of repository configuration entries.
///
/// Implementations look up dotted keys such as `core.eol`. `Ok(None)` is
/// the definite not-found signal; `Err` is reserved for hard store
/// failures.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Result<Option<ConfigValue>, ConfigError>;
}

/// One entry of an ordered value-to-policy mapping table.
#[derive(Debug, Clone, Copy)]
pub enum ConfigMap<T: Copy> {
    /// Matches any value that coerces to boolean false.
    False(T),
    /// Matches any value that coerces to boolean true.
    True(T),
    /// Matches a string value, case-insensitively.
    Str(&'static str, T),
}

/// Looks up `key` and resolves it through `map`, first matching entry wins.
///
/// Returns `Ok(None)` when the key is absent. A present value that matches
/// no entry is a [`ConfigError::InvalidValue`].
pub fn lookup_mapped<T: Copy>(
    source: &dyn ConfigSource,
    key: &str,
    map: &[ConfigMap<T>],
) -> Result<Option<T>, ConfigError> {
    let Some(value) = source.get(key)? else {
        return Ok(None);
    };

    for entry in map {
        match entry {
            ConfigMap::False(mapped) => {
                if value.as_bool() == Some(false) {
                    return Ok(Some(*mapped));
                }
            }
            ConfigMap::True(mapped) => {
                if value.as_bool() == Some(true) {
                    return Ok(Some(*mapped));
                }
            }
            ConfigMap::Str(name, mapped) => {
                if value.as_str().is_some_and(|s| s.eq_ignore_ascii_case(name)) {
                    return Ok(Some(*mapped));
                }
            }
        }
    }

    Err(ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
