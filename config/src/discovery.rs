//! # File Discovery
//!
//! Resolves a bare configuration name (`"config"`) to a file in a directory
//! (`"config.toml"`).

use crate::encryption::ENCRYPTED_SUFFIX;
use errors::{ConfigError, ConfigResult, critical};
use std::path::Path;
use tracing::debug;

/// Names of the regular files directly inside `directory`.
///
/// Symlinks are followed, so a link to a file counts as a file.
pub fn list_directory(directory: &Path) -> ConfigResult<Vec<String>> {
    let entries = std::fs::read_dir(directory).map_err(|e| {
        critical(ConfigError::not_accessible(
            directory.display().to_string(),
            e.to_string()
        ))
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            critical(ConfigError::not_accessible(
                directory.display().to_string(),
                e.to_string()
            ))
        })?;
        if entry.path().is_file() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Whether `entry` names a file for the configuration `name`.
///
/// `config` matches `config`, `config.toml` and `config.toml.fer`, but not
/// `config_old.toml`.
pub fn matches_name(entry: &str, name: &str) -> bool {
    entry == name || entry.split('.').next() == Some(name)
}

/// Finds the file in `directory` matching `name` and returns its path
/// relative to `directory`, with any `.fer` suffix removed.
///
/// When several entries match, the lexicographically smallest wins.
pub fn find_suitable_file(directory: &Path, name: &str) -> ConfigResult<String> {
    let found = list_directory(directory)?
        .into_iter()
        .filter(|entry| matches_name(entry, name))
        .min();

    let Some(entry) = found else {
        return Err(critical(ConfigError::not_accessible(
            directory.join(name).display().to_string(),
            format!("no file matching \"{name}\"")
        )));
    };

    let path = entry
        .strip_suffix(ENCRYPTED_SUFFIX)
        .map_or_else(|| entry.clone(), str::to_string);
    debug!(name, path = %path, "resolved configuration file");
    Ok(path)
}
