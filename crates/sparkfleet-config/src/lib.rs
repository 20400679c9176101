pub mod error;
pub mod model;

pub use error::*;
pub use model::*;

use std::path::{Path, PathBuf};

/// Environment variable naming a config file directly
pub const CONFIG_ENV: &str = "SPARKFLEET_CONFIG";

/// Find the cluster config file
///
/// Search order:
/// 1. `SPARKFLEET_CONFIG` environment variable
/// 2. current directory: sparkfleet.yaml, .sparkfleet.yaml
/// 3. ~/.config/sparkfleet/config.yaml
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!("{} points to missing file {}", CONFIG_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;
    for filename in ["sparkfleet.yaml", ".sparkfleet.yaml"] {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("sparkfleet").join("config.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// Load, validate and resolve a config file
///
/// Relative playbook directories are taken relative to the file.
pub fn load_config(path: &Path) -> Result<ClusterConfig> {
    tracing::debug!("Loading config from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let mut config = ClusterConfig::from_yaml(&content, path)?;
    config.validate()?;

    if let Some(base) = path.parent() {
        let base = if base.as_os_str().is_empty() {
            std::env::current_dir()?
        } else {
            base.to_path_buf()
        };
        config.resolve_paths(&base);
    }
    Ok(config)
}

/// `load_config` on the explicit path, or on whatever `find_config_file` finds
pub fn load(path: Option<&Path>) -> Result<(PathBuf, ClusterConfig)> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };
    let config = load_config(&path)?;
    Ok((path, config))
}
