//! # Handler Contract
//!
//! A handler transforms a [`Context`] into an updated [`Context`]. Loaders run
//! two ordered chains of handlers:
//!
//! - **lazy** handlers resolve parameters from a bare configuration name
//! - **loading** handlers fetch and parse raw data into [`KEY_RESULT`]
//!
//! Chains run strictly in order; the first failing handler aborts the chain.
//!
//! ## Key namespace
//! | Key | Written by | Read by |
//! |---|---|---|
//! | `name` | `lazy_load` | find-suitable-file handler |
//! | `path` | caller, find-suitable-file handler | file handler |
//! | `full_path` | file handler | callers |
//! | `text`, `format` | caller | source handler |
//! | `__result__` | final loading handler | `load` |

use errors::{ConfigError, ConfigResult, critical};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Reserved key holding the raw configuration tree after the loading chain.
pub const KEY_RESULT: &str = "__result__";

/// Bare configuration name seeded by `lazy_load`.
pub const KEY_NAME: &str = "name";

/// Path of a configuration file, relative to the handler's directory.
pub const KEY_PATH: &str = "path";

/// Resolved path of the file that was actually read.
pub const KEY_FULL_PATH: &str = "full_path";

/// Raw configuration text for the source handler.
pub const KEY_TEXT: &str = "text";

/// Format tag (`"toml"`, `".json"`, ...) for the source handler.
pub const KEY_FORMAT: &str = "format";

/// Key/value parameter bag threaded through a handler chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: Map<String, Value>
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Required or defaulted string argument.
    pub fn str_argument<'a>(&'a self, name: &str, default: Option<&'a str>) -> ConfigResult<&'a str> {
        match self.values.get(name) {
            Some(value) => value.as_str().ok_or_else(|| {
                critical(ConfigError::ArgumentType {
                    name: name.to_string(),
                    expected: "a string".to_string(),
                    value: value.to_string()
                })
            }),
            None => default.ok_or_else(|| self.missing(name))
        }
    }

    fn missing(&self, name: &str) -> ConfigError {
        critical(ConfigError::MissingArgument {
            name: name.to_string(),
            available: self.values.keys().cloned().collect()
        })
    }
}

impl From<Map<String, Value>> for Context {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl From<Context> for Value {
    fn from(context: Context) -> Self {
        Value::Object(context.values)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect()
        }
    }
}

/// Returns the value of argument `name` from `context`.
///
/// ## Errors
/// - [`ConfigError::MissingArgument`] when `name` is absent and no default is given
/// - [`ConfigError::InvalidArgument`] when `choices` is given and the value is not among them
pub fn get_argument<'a>(
    context: &'a Context,
    name: &str,
    default: Option<&'a Value>,
    choices: Option<&[Value]>
) -> ConfigResult<&'a Value> {
    let value = match context.get(name).or(default) {
        Some(value) => value,
        None => return Err(context.missing(name))
    };

    if let Some(choices) = choices {
        if !choices.contains(value) {
            return Err(critical(ConfigError::InvalidArgument {
                name: name.to_string(),
                value: value.to_string(),
                choices: choices.iter().map(Value::to_string).collect()
            }));
        }
    }

    Ok(value)
}

/// A single step of a loader chain.
///
/// Implemented for every `Fn(Context) -> ConfigResult<Context>` closure, so
/// plain functions can be registered directly.
pub trait Handler: Send + Sync {
    fn handle(&self, context: Context) -> ConfigResult<Context>;
}

impl<F> Handler for F
where
    F: Fn(Context) -> ConfigResult<Context> + Send + Sync
{
    fn handle(&self, context: Context) -> ConfigResult<Context> {
        self(context)
    }
}

/// Handler run during an eager load to produce [`KEY_RESULT`].
pub type LoadingHandler = Arc<dyn Handler>;

/// Handler run before an eager load to resolve parameters from a name.
pub type LazyHandler = Arc<dyn Handler>;

/// Which chain a handler belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerRole {
    Loading,
    Lazy
}

impl fmt::Display for HandlerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Lazy => write!(f, "lazy")
        }
    }
}

/// Threads `context` through `handlers` in order, stopping at the first error.
pub(crate) fn run_chain(
    role: HandlerRole,
    handlers: &[Arc<dyn Handler>],
    context: Context
) -> ConfigResult<Context> {
    handlers
        .iter()
        .enumerate()
        .try_fold(context, |context, (index, handler)| {
            debug!(%role, index, keys = context.len(), "running handler");
            handler.handle(context)
        })
}
