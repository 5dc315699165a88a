//! Configuration file loading for conclave
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CONCLAVE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./conclave.toml` or `./.conclave.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/conclave/config.toml`
//! 5. Fallback: `~/.config/conclave/config.toml`
//! 6. Default values

mod cast;
mod file_config;
mod loader;

pub use cast::{Cast, CastError};
pub use file_config::{
    FileConfig, FileOutputConfig, FileOutputFormat, FileParticipantConfig, FileQueryConfig,
    FileRole, FileSessionConfig,
};
pub use loader::ConfigLoader;
