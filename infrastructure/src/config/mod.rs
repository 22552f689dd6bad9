//! Configuration file loading for hustings
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./hustings.toml` or `./.hustings.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/hustings/config.toml`
//! 4. Fallback: `~/.config/hustings/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileDatabaseConfig, FileOpenAiConfig, FileServerConfig,
};
pub use loader::ConfigLoader;
