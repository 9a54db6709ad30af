//! # Source and File Handlers
//!
//! Handlers used by the preset loaders.
//!
//! - [`source_handler`]: parses `text` in `format`
//! - [`FileHandler`]: reads `path` under a directory, decrypting when it holds a key
//! - [`FindSuitableFileHandler`]: resolves a bare `name` to a `path`
//!
//! The file format is detected from the extension, so `app.yaml` and
//! `app.yaml.fer` both parse as YAML.

use crate::discovery::find_suitable_file;
use crate::encryption::{EncryptionKey, decrypt, with_encrypted_suffix};
use crate::format::{Format, parse, parse_as};
use crate::handler::{
    Context, Handler, KEY_FORMAT, KEY_FULL_PATH, KEY_NAME, KEY_PATH, KEY_RESULT, KEY_TEXT
};
use errors::{ConfigError, ConfigResult, critical};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path read by the file handler when the context names none.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Parses `{text, format}` into `__result__`.
pub fn source_handler(context: Context) -> ConfigResult<Context> {
    let text = context.str_argument(KEY_TEXT, None)?;
    let format = context.str_argument(KEY_FORMAT, None)?;
    let value = parse(text, format).map_err(|e| critical(e.into()))?;
    Ok(context.with(KEY_RESULT, value))
}

/// Reads a configuration file below a fixed directory.
///
/// Reads `{path}` (default [`DEFAULT_CONFIG_PATH`]) and writes
/// `{full_path, __result__}`. With a key, `<path>.fer` is preferred over
/// `<path>` and the content is decrypted before parsing.
#[derive(Debug, Clone)]
pub struct FileHandler {
    directory: PathBuf,
    key: Option<EncryptionKey>
}

impl FileHandler {
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn is_encrypted(&self) -> bool {
        self.key.is_some()
    }

    fn source_path(&self, path: &str) -> PathBuf {
        let plain = self.directory.join(path);
        if self.key.is_some() {
            let encrypted = with_encrypted_suffix(&plain);
            if encrypted.is_file() {
                return encrypted;
            }
        }
        plain
    }

    fn read(&self, source: &Path) -> ConfigResult<String> {
        let bytes = std::fs::read(source).map_err(|e| {
            critical(ConfigError::not_accessible(
                source.display().to_string(),
                e.to_string()
            ))
        })?;

        let bytes = match &self.key {
            Some(key) => decrypt(key, &bytes).map_err(|e| critical(e.into()))?,
            None => bytes
        };

        String::from_utf8(bytes).map_err(|e| {
            critical(ConfigError::not_accessible(
                source.display().to_string(),
                format!("content is not valid UTF-8: {e}")
            ))
        })
    }
}

impl Handler for FileHandler {
    fn handle(&self, context: Context) -> ConfigResult<Context> {
        let path = context.str_argument(KEY_PATH, Some(DEFAULT_CONFIG_PATH))?;
        let source = self.source_path(path);
        let format = Format::from_path(&source).map_err(|e| critical(e.into()))?;

        debug!(path = %source.display(), %format, encrypted = self.is_encrypted(), "reading configuration file");
        let text = self.read(&source)?;
        let value = parse_as(&text, format).map_err(|e| critical(e.into()))?;

        Ok(context
            .with(KEY_FULL_PATH, source.display().to_string())
            .with(KEY_RESULT, value))
    }
}

/// Builds a [`FileHandler`] rooted at `directory`.
///
/// ## Errors
/// [`ConfigError::SourceNotAccessible`] when `directory` is not a directory.
pub fn get_file_handler(
    directory: impl AsRef<Path>,
    key: Option<EncryptionKey>
) -> ConfigResult<FileHandler> {
    Ok(FileHandler {
        directory: existing_directory(directory.as_ref())?,
        key
    })
}

/// Lazy handler turning `{name}` into `{name, path}`.
#[derive(Debug, Clone)]
pub struct FindSuitableFileHandler {
    directory: PathBuf
}

impl Handler for FindSuitableFileHandler {
    fn handle(&self, context: Context) -> ConfigResult<Context> {
        let name = context.str_argument(KEY_NAME, None)?;
        let path = find_suitable_file(&self.directory, name)?;
        Ok(context.with(KEY_PATH, path))
    }
}

pub fn get_find_suitable_file_handler(
    directory: impl AsRef<Path>
) -> ConfigResult<FindSuitableFileHandler> {
    Ok(FindSuitableFileHandler {
        directory: existing_directory(directory.as_ref())?
    })
}

fn existing_directory(directory: &Path) -> ConfigResult<PathBuf> {
    if !directory.is_dir() {
        return Err(critical(ConfigError::not_accessible(
            directory.display().to_string(),
            "not a directory"
        )));
    }
    Ok(directory.to_path_buf())
}
