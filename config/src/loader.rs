//! # Configuration Loader
//!
//! An immutable pair of handler chains plus the builder that assembles it.
//!
//! ## Usage
//! ```rust
//! use chainconf::{ConfigurationLoader, Context, KEY_RESULT};
//! use errors::ConfigResult;
//! use serde_json::json;
//!
//! let loader = ConfigurationLoader::builder()
//!     .add_loading_handler(|ctx: Context| -> ConfigResult<Context> {
//!         Ok(ctx.with(KEY_RESULT, json!({"key": "value"})))
//!     })
//!     .build();
//!
//! let config = loader.load(Context::new()).unwrap();
//! assert_eq!(config["key"].as_str(), Some("value"));
//! ```

use crate::handler::{Context, Handler, HandlerRole, KEY_NAME, KEY_RESULT, run_chain};
use crate::item::{ConfigurationItem, freeze_tree};
use errors::{ConfigError, ConfigResult, critical};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Ordered lazy and loading handler chains, fixed at construction.
///
/// Cloning shares the chains; a loader never mutates them.
#[derive(Clone)]
pub struct ConfigurationLoader {
    lazy_handlers: Arc<[Arc<dyn Handler>]>,
    loading_handlers: Arc<[Arc<dyn Handler>]>
}

impl ConfigurationLoader {
    pub fn new(lazy_handlers: Vec<Arc<dyn Handler>>, loading_handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self {
            lazy_handlers: lazy_handlers.into(),
            loading_handlers: loading_handlers.into()
        }
    }

    pub fn builder() -> ConfigurationLoaderBuilder {
        ConfigurationLoaderBuilder::new()
    }

    pub fn lazy_handler_count(&self) -> usize {
        self.lazy_handlers.len()
    }

    pub fn loading_handler_count(&self) -> usize {
        self.loading_handlers.len()
    }

    /// Runs the loading chain on `parameters` and freezes the result.
    ///
    /// ## Errors
    /// - [`ConfigError::HandlerChainMisconfigured`] when the chain leaves
    ///   [`KEY_RESULT`] absent or holding a scalar
    /// - any error raised by a handler, unchanged
    #[tracing::instrument(skip_all, fields(parameters = parameters.len()))]
    pub fn load(&self, parameters: Context) -> ConfigResult<ConfigurationItem> {
        let mut context = run_chain(HandlerRole::Loading, &self.loading_handlers, parameters)?;

        let Some(raw) = context.remove(KEY_RESULT) else {
            return Err(critical(ConfigError::misconfigured(format!(
                "\"{KEY_RESULT}\" not found in the result: {:?}",
                context.keys().collect::<Vec<_>>()
            ))));
        };

        let item = freeze_tree(raw).map_err(|scalar| {
            critical(ConfigError::misconfigured(format!(
                "expected a mapping or a sequence, got {}",
                describe(&scalar)
            )))
        })?;

        debug!(entries = item.len(), "configuration loaded");
        Ok(item)
    }

    /// Resolves parameters for `name` through the lazy chain, then loads.
    #[tracing::instrument(skip(self))]
    pub fn lazy_load(&self, name: &str) -> ConfigResult<ConfigurationItem> {
        let context = Context::new().with(KEY_NAME, name);
        let parameters = run_chain(HandlerRole::Lazy, &self.lazy_handlers, context)?;
        self.load(parameters)
    }
}

impl fmt::Debug for ConfigurationLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationLoader")
            .field("lazy_handlers", &self.lazy_handlers.len())
            .field("loading_handlers", &self.loading_handlers.len())
            .finish()
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping"
    }
}

/// Accumulates handler chains for a [`ConfigurationLoader`].
///
/// [`build`](Self::build) snapshots the chains, so the builder can keep
/// growing without touching loaders it already produced.
#[derive(Default)]
pub struct ConfigurationLoaderBuilder {
    lazy_handlers: Vec<Arc<dyn Handler>>,
    loading_handlers: Vec<Arc<dyn Handler>>
}

impl ConfigurationLoaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_loading_handler(&mut self, handler: impl Handler + 'static) -> &mut Self {
        self.loading_handlers.push(Arc::new(handler));
        self
    }

    pub fn add_lazy_handler(&mut self, handler: impl Handler + 'static) -> &mut Self {
        self.lazy_handlers.push(Arc::new(handler));
        self
    }

    pub fn build(&self) -> ConfigurationLoader {
        ConfigurationLoader::new(self.lazy_handlers.clone(), self.loading_handlers.clone())
    }
}

impl fmt::Debug for ConfigurationLoaderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationLoaderBuilder")
            .field("lazy_handlers", &self.lazy_handlers.len())
            .field("loading_handlers", &self.loading_handlers.len())
            .finish()
    }
}
