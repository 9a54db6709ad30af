//! # chainconf
//!
//! Configuration loading built from chains of handlers.
//!
//! This crate provides:
//! - Loaders assembled from ordered lazy and loading handler chains
//! - A registry of named loaders with a lazy-load-and-cache lookup
//! - Deeply immutable configuration items
//! - Preset loaders for text, plain files and encrypted files (TOML/JSON/YAML/INI)
//! - Environment-driven quick setup
//!
//! # Best Practices
//!
//! - Uses `validator` crate for settings validation
//! - Every failure is logged through `tracing` before it is returned
//! - Thread-safe registry access

pub mod discovery;
pub mod encryption;
pub mod file_loader;
pub mod format;
pub mod handler;
pub mod item;
pub mod loader;
pub mod presets;
pub mod registry;
pub mod settings;

pub use discovery::find_suitable_file;
pub use encryption::{EncryptionKey, decrypt, encrypt, encrypt_file, generate_key};
pub use errors::{ConfigError, ConfigResult};
pub use file_loader::{
    DEFAULT_CONFIG_PATH, FileHandler, FindSuitableFileHandler, get_file_handler,
    get_find_suitable_file_handler, source_handler
};
pub use format::Format;
pub use handler::{
    Context, Handler, KEY_FORMAT, KEY_FULL_PATH, KEY_NAME, KEY_PATH, KEY_RESULT, KEY_TEXT,
    LazyHandler, LoadingHandler, get_argument
};
pub use item::{ConfigValue, ConfigurationItem, Freeze, freeze_configuration};
pub use loader::{ConfigurationLoader, ConfigurationLoaderBuilder};
pub use presets::{
    preset_encrypted_file_loader, preset_file_loader, preset_source_loader, quick_setup,
    quick_setup_from_env, setup_registry
};
pub use registry::{Configurations, DEFAULT_CONFIGURATION_NAME, DEFAULT_LOADER_NAME};
pub use settings::{LoaderSettings, load_settings_from_env};
pub use validator::Validate;
