pub mod types;

pub use types::{Config, DEFAULT_CHECKS, KustomizeConfig, OutputConfig};

use crate::error::{ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".kustomize-validator.toml";

/// Get the global config file path (~/.kustomize-validator.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (<root>/.kustomize-validator.toml)
pub fn local_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Parse configuration from TOML text.
pub fn load_from_str(content: &str, path: &Path) -> std::result::Result<Config, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Read and parse one configuration file.
pub fn load_from_path(path: &Path) -> std::result::Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&content, path)
}

/// Load configuration.
///
/// An explicit file must exist and parse. Otherwise the root directory is
/// checked first, then the home directory; a discovered file that cannot be
/// used is logged and skipped.
pub fn load_config(explicit: Option<&Path>, root: &Path) -> Result<Config> {
    if let Some(path) = explicit {
        log::debug!("loading config from {}", path.display());
        return Ok(load_from_path(path)?);
    }

    let candidates = std::iter::once(local_config_path(root)).chain(global_config_path());
    for path in candidates {
        if !path.is_file() {
            continue;
        }
        match load_from_path(&path) {
            Ok(config) => {
                log::debug!("loaded config from {}", path.display());
                return Ok(config);
            }
            Err(e) => log::warn!("ignoring config: {}", e),
        }
    }

    Ok(Config::default())
}
