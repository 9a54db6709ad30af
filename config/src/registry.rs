//! # Configuration Registry
//!
//! Named loaders plus a cache of loaded configurations.
//!
//! `get_config` lazily loads an unknown configuration through the default
//! loader and caches it; later lookups return the cached item until it is
//! unloaded. A per-name guard makes concurrent first lookups share one load.

use crate::handler::Context;
use crate::item::ConfigurationItem;
use crate::loader::ConfigurationLoader;
use errors::{ConfigError, ConfigResult, critical};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

/// Name of the loader used for lazy loading.
pub const DEFAULT_LOADER_NAME: &str = "default";

/// Name of the configuration returned when none is given.
pub const DEFAULT_CONFIGURATION_NAME: &str = "config";

static GLOBAL: LazyLock<Configurations> = LazyLock::new(Configurations::new);

/// Registry of loaders and cached configurations.
#[derive(Default)]
pub struct Configurations {
    loaders: RwLock<HashMap<String, ConfigurationLoader>>,
    configurations: RwLock<HashMap<String, ConfigurationItem>>,
    lazy_guards: Mutex<HashMap<String, Arc<Mutex<()>>>>
}

impl Configurations {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static Configurations {
        &GLOBAL
    }

    pub fn add_loader(
        &self,
        loader: ConfigurationLoader,
        name: &str,
        allow_overwrite: bool
    ) -> ConfigResult<()> {
        let mut loaders = self.loaders.write();
        if !allow_overwrite && loaders.contains_key(name) {
            return Err(critical(ConfigError::LoaderAlreadyExists {
                name: name.to_string()
            }));
        }
        loaders.insert(name.to_string(), loader);
        info!(loader = name, "loader registered");
        Ok(())
    }

    pub fn remove_loader(&self, name: &str) -> ConfigResult<ConfigurationLoader> {
        let removed = self.loaders.write().remove(name);
        match removed {
            Some(loader) => {
                info!(loader = name, "loader removed");
                Ok(loader)
            }
            None => Err(critical(ConfigError::loader_not_found(name)))
        }
    }

    pub fn get_loader(&self, name: &str) -> ConfigResult<ConfigurationLoader> {
        self.loaders
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| critical(ConfigError::loader_not_found(name)))
    }

    pub fn has_loader(&self, name: &str) -> bool {
        self.loaders.read().contains_key(name)
    }

    /// Removes a cached configuration and returns it.
    pub fn unload(&self, name: &str) -> ConfigResult<ConfigurationItem> {
        let removed = self.configurations.write().remove(name);
        match removed {
            Some(item) => {
                info!(configuration = name, "configuration unloaded");
                Ok(item)
            }
            None => Err(critical(ConfigError::config_not_found(
                name,
                "it is not loaded"
            )))
        }
    }

    pub fn add_config(
        &self,
        item: ConfigurationItem,
        name: &str,
        allow_overwrite: bool
    ) -> ConfigResult<()> {
        let mut configurations = self.configurations.write();
        if !allow_overwrite && configurations.contains_key(name) {
            return Err(critical(ConfigError::ConfigLoadConflict {
                name: name.to_string()
            }));
        }
        configurations.insert(name.to_string(), item);
        info!(configuration = name, "configuration cached");
        Ok(())
    }

    /// Loads `name` eagerly with the loader registered as `loader_name`.
    ///
    /// A conflicting cached entry is detected after loading, so the loader
    /// runs even when the insertion is then rejected.
    pub fn load_config(
        &self,
        name: &str,
        loader_name: &str,
        allow_overwrite: bool,
        parameters: Context
    ) -> ConfigResult<ConfigurationItem> {
        let loader = self.get_loader(loader_name)?;
        let item = loader.load(parameters)?;
        self.add_config(item.clone(), name, allow_overwrite)?;
        Ok(item)
    }

    /// Returns the cached configuration `name`, lazily loading it through
    /// the default loader when allowed.
    ///
    /// ## Errors
    /// - [`ConfigError::ConfigNotFound`] when `name` is not cached and lazy
    ///   loading is disallowed
    /// - [`ConfigError::LoaderNotFound`] when lazy loading needs a default loader
    ///   and none is registered
    /// - any error raised by the loader
    pub fn get_config(&self, name: &str, allow_lazy_load: bool) -> ConfigResult<ConfigurationItem> {
        if let Some(item) = self.cached(name) {
            return Ok(item);
        }

        if !allow_lazy_load {
            return Err(critical(ConfigError::config_not_found(
                name,
                "it is not loaded and lazy loading is disabled"
            )));
        }

        let guard = self.lazy_guard(name);
        let result = {
            let _loading = guard.lock();
            self.lazy_load_and_cache(name)
        };
        self.release_lazy_guard(name, guard);
        result
    }

    /// [`get_config`](Self::get_config) for the default name with lazy loading.
    pub fn default_config(&self) -> ConfigResult<ConfigurationItem> {
        self.get_config(DEFAULT_CONFIGURATION_NAME, true)
    }

    pub fn is_configuration_loaded(&self, name: &str) -> bool {
        self.configurations.read().contains_key(name)
    }

    pub fn loader_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loaders.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn configuration_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.configurations.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Drops every loader and cached configuration.
    pub fn clear(&self) {
        self.loaders.write().clear();
        self.configurations.write().clear();
        self.lazy_guards.lock().clear();
        info!("registry cleared");
    }

    fn cached(&self, name: &str) -> Option<ConfigurationItem> {
        self.configurations.read().get(name).cloned()
    }

    /// Runs under the per-name guard.
    fn lazy_load_and_cache(&self, name: &str) -> ConfigResult<ConfigurationItem> {
        if let Some(item) = self.cached(name) {
            debug!(configuration = name, "loaded concurrently");
            return Ok(item);
        }

        let loader = self.get_loader(DEFAULT_LOADER_NAME)?;
        info!(configuration = name, "lazy loading configuration");
        let item = loader.lazy_load(name)?;

        // An eager add_config/load_config may have cached `name` meanwhile.
        let cached = match self.configurations.write().entry(name.to_string()) {
            Entry::Occupied(existing) => {
                debug!(configuration = name, "keeping concurrently cached configuration");
                existing.get().clone()
            }
            Entry::Vacant(slot) => {
                info!(configuration = name, "configuration cached");
                slot.insert(item).clone()
            }
        };
        Ok(cached)
    }

    fn lazy_guard(&self, name: &str) -> Arc<Mutex<()>> {
        self.lazy_guards
            .lock()
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    /// Drops this caller's handle and forgets the guard once nobody else holds it.
    ///
    /// Handles are only cloned and dropped under the `lazy_guards` lock, so a
    /// strong count of one means the map holds the last reference.
    fn release_lazy_guard(&self, name: &str, guard: Arc<Mutex<()>>) {
        let mut guards = self.lazy_guards.lock();
        drop(guard);
        if guards.get(name).is_some_and(|g| Arc::strong_count(g) == 1) {
            guards.remove(name);
        }
    }
}

impl std::fmt::Debug for Configurations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configurations")
            .field("loaders", &self.loader_names())
            .field("configurations", &self.configuration_names())
            .finish()
    }
}
