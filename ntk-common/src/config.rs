//! Configuration file lookup and resource path resolution

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable consulted for the voice resource path
pub const RESOURCE_PATH_ENV: &str = "NTK_RESOURCE_PATH";

/// Resource path resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. `resource_path` key of the TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_resource_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config_file_value: Option<&Path>,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = config_file_value {
        return path.to_path_buf();
    }

    // Priority 4: OS-dependent compiled default
    default_resource_path()
}

/// Locate the configuration file for the platform
///
/// Linux checks `~/.config/ntk/config.toml` first, then `/etc/ntk/config.toml`.
/// Other platforms only check the per-user config directory.
pub fn find_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("ntk").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/ntk/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::NotFound("No config file found".to_string()))
}

/// Read and deserialize a TOML file
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Loading TOML config from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok(toml::from_str(&content)?)
}

/// OS-dependent default resource path
fn default_resource_path() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/ntk (or /var/lib/ntk for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("ntk"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/ntk"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("ntk"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/ntk"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("ntk"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\ntk"))
    } else {
        PathBuf::from("./ntk_data")
    }
}
