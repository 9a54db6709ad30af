//! # Preset Loaders
//!
//! Ready-made loaders for the common sources, plus the quick-setup entry
//! points that register one as the default loader.
//!
//! ## Usage
//! ```rust,no_run
//! use chainconf::quick_setup;
//!
//! let config = quick_setup("conf").unwrap();
//! println!("{:?}", config.get_path("app.name"));
//! ```

use crate::encryption::EncryptionKey;
use crate::file_loader::{get_file_handler, get_find_suitable_file_handler, source_handler};
use crate::item::ConfigurationItem;
use crate::loader::ConfigurationLoader;
use crate::registry::{Configurations, DEFAULT_LOADER_NAME};
use crate::settings::{LoaderSettings, load_settings_from_env};
use errors::{ConfigResult, critical};
use std::path::Path;
use tracing::info;

/// Loader parsing `{text, format}` parameters.
pub fn preset_source_loader() -> ConfigurationLoader {
    ConfigurationLoader::builder()
        .add_loading_handler(source_handler)
        .build()
}

/// Loader reading files under `directory`, lazily resolving bare names.
///
/// With `key_file`, files are decrypted with the key it holds.
///
/// ## Errors
/// - [`errors::ConfigError::SourceNotAccessible`] when `directory` does not exist
/// - [`errors::ConfigError::Decryption`] when `key_file` cannot be read or holds no valid key
pub fn preset_file_loader(
    directory: impl AsRef<Path>,
    key_file: Option<&Path>
) -> ConfigResult<ConfigurationLoader> {
    let key = match key_file {
        Some(path) => Some(EncryptionKey::read_from(path).map_err(|e| critical(e.into()))?),
        None => None
    };
    preset_encrypted_file_loader(directory, key)
}

/// [`preset_file_loader`] with an already loaded key.
pub fn preset_encrypted_file_loader(
    directory: impl AsRef<Path>,
    key: Option<EncryptionKey>
) -> ConfigResult<ConfigurationLoader> {
    let directory = directory.as_ref();
    Ok(ConfigurationLoader::builder()
        .add_loading_handler(get_file_handler(directory, key)?)
        .add_lazy_handler(get_find_suitable_file_handler(directory)?)
        .build())
}

/// Registers the file preset described by `settings` as the default loader.
pub fn setup_registry(registry: &Configurations, settings: &LoaderSettings) -> ConfigResult<()> {
    let loader = preset_file_loader(&settings.directory, settings.key_file.as_deref().map(Path::new))?;
    registry.add_loader(loader, DEFAULT_LOADER_NAME, settings.allow_overwrite)?;
    info!(
        directory = %settings.directory,
        encrypted = settings.key_file.is_some(),
        "default loader configured"
    );
    Ok(())
}

/// Registers a file preset for `directory` as the global default loader and
/// returns the `config` configuration.
///
/// An existing default loader is replaced.
pub fn quick_setup(directory: impl AsRef<Path>) -> ConfigResult<ConfigurationItem> {
    let settings = LoaderSettings {
        directory: directory.as_ref().display().to_string(),
        allow_overwrite: true,
        ..LoaderSettings::default()
    }
    .validated()?;
    setup_registry(Configurations::global(), &settings)?;
    Configurations::global().default_config()
}

/// [`quick_setup`] driven by the `CHAINCONF_*` environment variables.
pub fn quick_setup_from_env() -> ConfigResult<ConfigurationItem> {
    let settings = load_settings_from_env()?;
    setup_registry(Configurations::global(), &settings)?;
    Configurations::global().default_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::{encrypt_file, generate_key};
    use crate::handler::{Context, KEY_FORMAT, KEY_PATH, KEY_TEXT};
    use errors::ConfigError;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_preset_source_loader() {
        let loader = preset_source_loader();
        let result = loader
            .load(
                Context::new()
                    .with(KEY_TEXT, "key = \"value\"")
                    .with(KEY_FORMAT, ".toml")
            )
            .unwrap();
        assert_eq!(result.to_json(), json!({"key": "value"}));
    }

    #[test]
    fn test_preset_file_loader_not_encrypted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "key = \"value\"").unwrap();

        let loader = preset_file_loader(dir.path(), None).unwrap();
        let result = loader
            .load(Context::new().with(KEY_PATH, "config.toml"))
            .unwrap();
        assert_eq!(result.to_json(), json!({"key": "value"}));

        let result = loader.lazy_load("config").unwrap();
        assert_eq!(result.to_json(), json!({"key": "value"}));
    }

    #[test]
    fn test_preset_file_loader_encrypted() {
        let dir = TempDir::new().unwrap();
        let key_file = dir.path().join("dummy.key");
        fs::write(dir.path().join("config.toml"), "key = \"value\"").unwrap();
        let key = generate_key(&key_file).unwrap();
        encrypt_file(&dir.path().join("config.toml"), &key).unwrap();

        let loader = preset_file_loader(dir.path(), Some(&key_file)).unwrap();
        let result = loader
            .load(Context::new().with(KEY_PATH, "config.toml"))
            .unwrap();
        assert_eq!(result.to_json(), json!({"key": "value"}));

        let result = loader.lazy_load("config").unwrap();
        assert_eq!(result.to_json(), json!({"key": "value"}));
    }

    #[test]
    fn test_preset_file_loader_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = preset_file_loader(dir.path().join("absent"), None).unwrap_err();
        assert!(matches!(err, ConfigError::SourceNotAccessible { .. }));
    }

    #[test]
    fn test_preset_file_loader_missing_key_file() {
        let dir = TempDir::new().unwrap();
        let err = preset_file_loader(dir.path(), Some(&dir.path().join("absent.key"))).unwrap_err();
        assert!(matches!(err, ConfigError::Decryption { .. }));
    }

    #[test]
    fn test_setup_registry_respects_overwrite() {
        let dir = TempDir::new().unwrap();
        let registry = Configurations::new();
        let settings = LoaderSettings {
            directory: dir.path().display().to_string(),
            ..LoaderSettings::default()
        };

        setup_registry(&registry, &settings).unwrap();
        assert!(registry.has_loader(DEFAULT_LOADER_NAME));
        assert!(matches!(
            setup_registry(&registry, &settings),
            Err(ConfigError::LoaderAlreadyExists { .. })
        ));

        let settings = LoaderSettings {
            allow_overwrite: true,
            ..settings
        };
        setup_registry(&registry, &settings).unwrap();
    }
}
