//! Configuration for the ntk-ap advice player
//!
//! Bootstrap settings come from a TOML file; everything has a built-in
//! default so the file is optional.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (--resource-path, --language)
//! 2. Environment variables (NTK_RESOURCE_PATH)
//! 3. TOML configuration file
//! 4. Built-in defaults

use crate::error::{Error, Result};
use ntk_common::config::{find_config_file, load_toml};
use ntk_common::NavigationSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Folder holding one sub-folder per voice language
    #[serde(default)]
    pub resource_path: Option<PathBuf>,

    /// Voice language folder name
    #[serde(default = "default_voice_language")]
    pub voice_language: String,

    /// Capacity of the event broadcast channel
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub navigation: NavigationSettings,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            resource_path: None,
            voice_language: default_voice_language(),
            event_bus_capacity: default_event_bus_capacity(),
            logging: LoggingConfig::default(),
            navigation: NavigationSettings::default(),
        }
    }
}

fn default_voice_language() -> String {
    "en_us".to_string()
}

fn default_event_bus_capacity() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let config: TomlConfig = load_toml(path)?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the explicit file if given, otherwise the platform config file,
    /// otherwise defaults
    ///
    /// An explicit path that fails to load is an error; a discovered file
    /// that fails to load is logged and replaced by defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match find_config_file() {
            Ok(path) => match Self::load(&path) {
                Ok(config) => Ok(config),
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    Ok(Self::default())
                }
            },
            Err(_) => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.voice_language.trim().is_empty() {
            return Err(Error::Config("voice_language must not be empty".to_string()));
        }
        if self.event_bus_capacity == 0 {
            return Err(Error::Config("event_bus_capacity must be positive".to_string()));
        }
        self.navigation.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntk_common::settings::{DistanceUnit, RouteType};
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.voice_language, "en_us");
        assert_eq!(config.event_bus_capacity, 100);
        assert_eq!(config.logging.level, "info");
        assert!(config.resource_path.is_none());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = write_config("");
        let config = TomlConfig::load(file.path()).unwrap();
        assert_eq!(config.voice_language, "en_us");
        assert_eq!(config.navigation, NavigationSettings::default());
    }

    #[test]
    fn test_full_file() {
        let file = write_config(
            r#"
resource_path = "/opt/ntk"
voice_language = "de_de"
event_bus_capacity = 16

[logging]
level = "debug"

[navigation]
route_type = "bicycle_shortest"
distance_unit = "miles_feet"
speed_warning_in_town = 1
"#,
        );
        let config = TomlConfig::load(file.path()).unwrap();
        assert_eq!(config.resource_path, Some(PathBuf::from("/opt/ntk")));
        assert_eq!(config.voice_language, "de_de");
        assert_eq!(config.event_bus_capacity, 16);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.navigation.route_type, RouteType::BicycleShortest);
        assert_eq!(config.navigation.distance_unit, DistanceUnit::MilesFeet);
        assert_eq!(config.navigation.speed_warning_in_town, 1);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config("event_bus_capacity = 0\n");
        assert!(matches!(TomlConfig::load(file.path()), Err(Error::Config(_))));

        let file = write_config("voice_language = \"  \"\n");
        assert!(TomlConfig::load(file.path()).is_err());

        let file = write_config("[navigation]\nspeed_warning_out_town = 9\n");
        assert!(TomlConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let file = write_config("voice_language = \n");
        assert!(matches!(TomlConfig::load(file.path()), Err(Error::Common(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = TomlConfig::load_or_default(Some(&dir.path().join("absent.toml")));
        assert!(result.is_err());
    }
}
