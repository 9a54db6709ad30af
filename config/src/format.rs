//! # Source Formats
//!
//! Parses configuration text into a raw JSON tree.
//!
//! ## Supported Formats
//! - `toml`: TOML
//! - `json`: JSON
//! - `yaml`, `yml`: YAML
//! - `ini`, `cfg`: INI, sections become nested mappings
//!
//! Format tags are matched case-insensitively, with or without a leading
//! period, so `".toml"` and `"TOML"` both select TOML.

use errors::ConfigError;
use serde_json::{Map, Number, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Format parsing error.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Unknown configuration format: {0}")]
    UnknownFormat(String),

    #[error("Config file has no extension: {0}")]
    NoExtension(String),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(String),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(String),

    #[error("Failed to parse INI: {0}")]
    IniParse(String)
}

impl From<FormatError> for ConfigError {
    fn from(error: FormatError) -> Self {
        match error {
            FormatError::UnknownFormat(format) => ConfigError::UnknownFormat { format },
            FormatError::NoExtension(path) => ConfigError::UnknownFormat {
                format: format!("<no extension> ({path})")
            },
            FormatError::TomlParse(reason) => parse_error(Format::Toml, reason),
            FormatError::JsonParse(reason) => parse_error(Format::Json, reason),
            FormatError::YamlParse(reason) => parse_error(Format::Yaml, reason),
            FormatError::IniParse(reason) => parse_error(Format::Ini, reason)
        }
    }
}

fn parse_error(format: Format, reason: String) -> ConfigError {
    ConfigError::Parse {
        format: format.to_string(),
        reason
    }
}

/// A configuration text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
    Yaml,
    Ini
}

impl Format {
    /// Detects the format from a file name, ignoring a trailing encryption suffix.
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        let plain = crate::encryption::strip_encrypted_suffix(path);
        let extension = plain
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| FormatError::NoExtension(path.display().to_string()))?;
        extension.parse()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Ini => "ini"
        }
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let normalized = tag.trim().trim_start_matches('.').to_lowercase();
        match normalized.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "ini" | "cfg" => Ok(Self::Ini),
            _ => Err(FormatError::UnknownFormat(tag.to_string()))
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses `text` written in the format named by `tag`.
pub fn parse(text: &str, tag: &str) -> Result<Value, FormatError> {
    parse_as(text, tag.parse()?)
}

pub fn parse_as(text: &str, format: Format) -> Result<Value, FormatError> {
    match format {
        Format::Toml => parse_toml(text),
        Format::Json => serde_json::from_str(text).map_err(|e| FormatError::JsonParse(e.to_string())),
        Format::Yaml => parse_yaml(text),
        Format::Ini => parse_ini(text)
    }
}

fn parse_toml(text: &str) -> Result<Value, FormatError> {
    let table: toml::Table =
        toml::from_str(text).map_err(|e| FormatError::TomlParse(e.to_string()))?;
    Ok(toml_to_json(toml::Value::Table(table)))
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect()
        )
    }
}

fn parse_yaml(text: &str) -> Result<Value, FormatError> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| FormatError::YamlParse(e.to_string()))?;
    yaml_to_json(value)
}

fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, FormatError> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(yaml_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value)?
    })
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, FormatError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        other => Err(FormatError::YamlParse(format!(
            "unsupported mapping key: {other:?}"
        )))
    }
}

fn parse_ini(text: &str) -> Result<Value, FormatError> {
    let ini = ini::Ini::load_from_str(text).map_err(|e| FormatError::IniParse(e.to_string()))?;

    let mut root = Map::new();
    for (section, properties) in ini.iter() {
        let entries: Map<String, Value> = properties
            .iter()
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect();
        match section {
            None => root.extend(entries),
            Some(name) => {
                root.insert(name.to_string(), Value::Object(entries));
            }
        }
    }
    Ok(Value::Object(root))
}
