//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod validate;

use std::path::Path;

use tarcheck_core::TarcheckConfig;

/// Load configuration from the given path, falling back to defaults when no
/// path is supplied.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TarcheckConfig> {
    match config_path {
        Some(path) => Ok(TarcheckConfig::from_file(Path::new(path))?),
        None => Ok(TarcheckConfig::default()),
    }
}
