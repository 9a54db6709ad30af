//! # Loader Settings
//!
//! Settings for the quick-setup path, loaded from environment variables.
//!
//! # Environment Variables
//! - `CHAINCONF_DIRECTORY`: directory holding configuration files (default: ".")
//! - `CHAINCONF_KEY_FILE`: key file for encrypted configuration files (optional)
//! - `CHAINCONF_LOG_LEVEL`: logging level, trace/debug/info/warn/error (default: "info")
//! - `CHAINCONF_ALLOW_OVERWRITE`: replace an existing default loader (default: false)

use errors::{ConfigError, ConfigResult, critical};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::level_filters::LevelFilter;
use validator::Validate;

pub const ENV_DIRECTORY: &str = "CHAINCONF_DIRECTORY";
pub const ENV_KEY_FILE: &str = "CHAINCONF_KEY_FILE";
pub const ENV_LOG_LEVEL: &str = "CHAINCONF_LOG_LEVEL";
pub const ENV_ALLOW_OVERWRITE: &str = "CHAINCONF_ALLOW_OVERWRITE";

/// Settings driving [`crate::presets::setup_registry`].
///
/// ## Fields
/// - `directory`: directory scanned by the file preset
/// - `key_file`: optional key file enabling decryption
/// - `logging_level`: maximum level for the subscriber, see [`LoaderSettings::level_filter`]
/// - `allow_overwrite`: whether registering the default loader may replace one
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct LoaderSettings {
    #[serde(default = "default_directory")]
    #[validate(length(min = 1, max = 4096))]
    pub directory: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 4096))]
    pub key_file: Option<String>,

    #[serde(default = "default_logging_level")]
    #[validate(custom(function = "validate_logging_level"))]
    pub logging_level: String,

    #[serde(default)]
    pub allow_overwrite: bool
}

fn default_directory() -> String {
    ".".to_string()
}

fn default_logging_level() -> String {
    "info".to_string()
}

fn validate_logging_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid logging level"))
    }
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            key_file: None,
            logging_level: default_logging_level(),
            allow_overwrite: false
        }
    }
}

impl LoaderSettings {
    /// Runs the `validator` rules, mapping failures onto [`ConfigError::InvalidSettings`].
    pub fn validated(self) -> ConfigResult<Self> {
        self.validate().map_err(|errors| {
            critical(ConfigError::InvalidSettings {
                reason: errors.to_string()
            })
        })?;
        Ok(self)
    }

    /// Settings with only `logging_level` changed from the defaults.
    pub fn with_logging_level(level: impl Into<String>) -> Self {
        Self {
            logging_level: level.into(),
            ..Self::default()
        }
    }

    /// `logging_level` as a tracing filter; `INFO` if it does not parse.
    pub fn level_filter(&self) -> LevelFilter {
        self.logging_level.parse().unwrap_or(LevelFilter::INFO)
    }
}

/// Loads [`LoaderSettings`] from `CHAINCONF_*` variables and validates them.
///
/// Unset variables fall back to defaults; a set but unparsable
/// `CHAINCONF_ALLOW_OVERWRITE` is an error.
pub fn load_settings_from_env() -> ConfigResult<LoaderSettings> {
    let allow_overwrite = match env::var(ENV_ALLOW_OVERWRITE) {
        Ok(_) => parse_env(ENV_ALLOW_OVERWRITE).map_err(|e| {
            critical(ConfigError::InvalidSettings {
                reason: format!("{ENV_ALLOW_OVERWRITE}: {e}")
            })
        })?,
        Err(_) => false
    };

    LoaderSettings {
        directory: env::var(ENV_DIRECTORY).unwrap_or_else(|_| default_directory()),
        key_file: env::var(ENV_KEY_FILE).ok(),
        logging_level: env::var(ENV_LOG_LEVEL).unwrap_or_else(|_| default_logging_level()),
        allow_overwrite
    }
    .validated()
}

fn parse_env<T>(key: &str) -> Result<T, Box<dyn std::error::Error>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static
{
    match env::var(key) {
        Ok(s) => s
            .parse::<T>()
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error>),
        Err(e) => Err(Box::new(e) as Box<dyn std::error::Error>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            env::remove_var(ENV_DIRECTORY);
            env::remove_var(ENV_KEY_FILE);
            env::remove_var(ENV_LOG_LEVEL);
            env::remove_var(ENV_ALLOW_OVERWRITE);
        }
    }

    #[test]
    #[serial]
    fn test_load_settings_from_env_defaults() {
        clear_env();
        let settings = load_settings_from_env().unwrap();
        assert_eq!(settings, LoaderSettings::default());
        assert_eq!(settings.directory, ".");
        assert_eq!(settings.logging_level, "info");
    }

    #[test]
    #[serial]
    fn test_load_settings_from_env_overrides() {
        clear_env();
        unsafe {
            env::set_var(ENV_DIRECTORY, "conf");
            env::set_var(ENV_KEY_FILE, "config.key");
            env::set_var(ENV_LOG_LEVEL, "debug");
            env::set_var(ENV_ALLOW_OVERWRITE, "true");
        }

        let settings = load_settings_from_env().unwrap();
        clear_env();

        assert_eq!(settings.directory, "conf");
        assert_eq!(settings.key_file.as_deref(), Some("config.key"));
        assert_eq!(settings.logging_level, "debug");
        assert!(settings.allow_overwrite);
    }

    #[test]
    #[serial]
    fn test_load_settings_invalid_bool() {
        clear_env();
        unsafe {
            env::set_var(ENV_ALLOW_OVERWRITE, "sometimes");
        }
        let result = load_settings_from_env();
        clear_env();
        assert!(matches!(result, Err(ConfigError::InvalidSettings { .. })));
    }

    #[test]
    fn test_validate_invalid_logging_level() {
        let settings = LoaderSettings {
            logging_level: "loud".to_string(),
            ..LoaderSettings::default()
        };
        assert!(matches!(
            settings.validated(),
            Err(ConfigError::InvalidSettings { .. })
        ));
    }

    #[test]
    fn test_validate_empty_directory() {
        let settings = LoaderSettings {
            directory: String::new(),
            ..LoaderSettings::default()
        };
        assert!(settings.validated().is_err());
    }

    #[test]
    fn test_validate_empty_key_file() {
        let settings = LoaderSettings {
            key_file: Some(String::new()),
            ..LoaderSettings::default()
        };
        assert!(settings.validated().is_err());
    }

    #[test]
    fn test_validate_valid_logging_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let settings = LoaderSettings {
                logging_level: level.to_string(),
                ..LoaderSettings::default()
            };
            assert!(settings.validated().is_ok());
        }
    }

    #[test]
    fn test_level_filter() {
        assert_eq!(LoaderSettings::default().level_filter(), LevelFilter::INFO);
        assert_eq!(LoaderSettings::with_logging_level("debug").level_filter(), LevelFilter::DEBUG);
        assert_eq!(LoaderSettings::with_logging_level("error").level_filter(), LevelFilter::ERROR);
        assert!(LoaderSettings::with_logging_level("loud").validated().is_err());
    }

    #[test]
    fn test_parse_env_missing() {
        let result: Result<bool, _> = parse_env("CHAINCONF_NONEXISTENT_VAR");
        assert!(result.is_err());
    }
}
