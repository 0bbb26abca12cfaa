//! # Sluice - Safe Content Filters for Git Storage
//!
//! Sluice is the content transformation pipeline a version-control storage
//! layer runs when file content moves between its working form and the
//! object store. It answers two questions: is this content binary or text
//! (so line-ending normalization is safe), and which ordered transforms
//! apply to a given path and transfer direction — then executes those
//! transforms over a pair of reusable buffers with cancel-without-corruption
//! semantics.
//!
//! ## Quick Start
//!
//! ```
//! use sluice::{FilterBuffer, FilterChain, FilterMode, MemoryConfig, Repository};
//!
//! let mut config = MemoryConfig::new();
//! config.set("core.auto_crlf", true);
//! let mut repo = Repository::with_config(Box::new(config));
//!
//! let chain = FilterChain::load(&mut repo, "src/main.c", FilterMode::ToStorage)?;
//!
//! let mut source = FilterBuffer::from_slice(b"int main();\r\n");
//! let mut dest = FilterBuffer::new();
//! chain.apply(&mut dest, &mut source)?;
//!
//! assert_eq!(dest.as_slice(), b"int main();\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod buffer;
pub mod chain;
pub mod config;
pub mod repo;
pub mod settings;
pub mod stages;
pub mod text;

pub use buffer::FilterBuffer;
pub use chain::{ApplyError, BuildError, FilterChain, FilterMode, Stage, StageStatus};
pub use config::{ConfigError, ConfigMap, ConfigSource, ConfigValue, FileConfig, MemoryConfig};
pub use repo::Repository;
pub use settings::{AutoCrlfPolicy, EolPolicy, FilterSettings};
pub use text::{TextStats, gather_stats};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
