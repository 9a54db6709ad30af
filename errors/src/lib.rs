//! # chainconf Errors
//!
//! Error taxonomy shared by every chainconf crate.
//!
//! - Uses `thiserror` for structured error definitions
//! - Every variant carries named fields so messages stay readable
//! - [`critical`] logs a failure before it is handed back to the caller

use thiserror::Error;

/// Result alias used across the configuration loader.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failures raised while building, registering, or running configuration loaders.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration \"{name}\" cannot be found: {reason}")]
    ConfigNotFound { name: String, reason: String },

    #[error("Loader \"{name}\" cannot be found")]
    LoaderNotFound { name: String },

    #[error("A loader named \"{name}\" already exists")]
    LoaderAlreadyExists { name: String },

    #[error("Configuration \"{name}\" is already loaded, allow overwrite to erase the old one")]
    ConfigLoadConflict { name: String },

    /// The loading chain left the result key empty or filled it with a scalar.
    #[error("The loader is not configured correctly: {reason}")]
    HandlerChainMisconfigured { reason: String },

    #[error("Missing required argument \"{name}\" (available: {available:?})")]
    MissingArgument { name: String, available: Vec<String> },

    #[error("Argument \"{name}\" must be one of {choices:?}, got {value}")]
    InvalidArgument {
        name: String,
        value: String,
        choices: Vec<String>
    },

    #[error("Argument \"{name}\" must be {expected}, got {value}")]
    ArgumentType {
        name: String,
        expected: String,
        value: String
    },

    #[error("Source not accessible: {path}: {reason}")]
    SourceNotAccessible { path: String, reason: String },

    #[error("Failed to parse {format} source: {reason}")]
    Parse { format: String, reason: String },

    #[error("Unknown configuration format: {format}")]
    UnknownFormat { format: String },

    #[error("Decryption failed: {reason}")]
    Decryption { reason: String },

    #[error("Invalid settings: {reason}")]
    InvalidSettings { reason: String }
}

impl ConfigError {
    pub fn config_not_found(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigNotFound {
            name: name.into(),
            reason: reason.into()
        }
    }

    pub fn loader_not_found(name: impl Into<String>) -> Self {
        Self::LoaderNotFound { name: name.into() }
    }

    pub fn misconfigured(reason: impl Into<String>) -> Self {
        Self::HandlerChainMisconfigured {
            reason: reason.into()
        }
    }

    pub fn not_accessible(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceNotAccessible {
            path: path.into(),
            reason: reason.into()
        }
    }

    /// True for every variant of the argument-error kind.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument { .. }
                | Self::InvalidArgument { .. }
                | Self::ArgumentType { .. }
        )
    }
}

/// Logs `error` at error level and returns it, so call sites read
/// `return Err(critical(...))`.
pub fn critical(error: ConfigError) -> ConfigError {
    tracing::error!(%error, "configuration failure");
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_critical_logs_message() {
        let err = critical(ConfigError::loader_not_found("missing"));
        assert!(matches!(err, ConfigError::LoaderNotFound { ref name } if name == "missing"));
        assert!(logs_contain("Loader \"missing\" cannot be found"));
    }

    #[test]
    fn test_critical_returns_same_variant() {
        let err = critical(ConfigError::ConfigLoadConflict {
            name: "config".to_string()
        });
        assert!(matches!(err, ConfigError::ConfigLoadConflict { .. }));
    }

    #[test]
    fn test_display_messages() {
        let err = ConfigError::InvalidArgument {
            name: "format".to_string(),
            value: "xml".to_string(),
            choices: vec!["toml".to_string(), "json".to_string()]
        };
        assert_eq!(
            err.to_string(),
            "Argument \"format\" must be one of [\"toml\", \"json\"], got xml"
        );

        let err = ConfigError::LoaderAlreadyExists {
            name: "default".to_string()
        };
        assert_eq!(err.to_string(), "A loader named \"default\" already exists");
    }

    #[test]
    fn test_is_argument_error() {
        let missing = ConfigError::MissingArgument {
            name: "text".to_string(),
            available: vec![]
        };
        assert!(missing.is_argument_error());
        assert!(!ConfigError::misconfigured("x").is_argument_error());
    }
}
