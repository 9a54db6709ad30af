//! Shared test fixtures for the chainconf workspace.
//!
//! Provides scratch configuration directories and sample documents:
//! - [`ConfigDir`]: a temporary directory removed on drop
//! - sample TOML/JSON/YAML/INI sources describing the same `app`/`debug` settings
//!
//! Fixtures never depend on chainconf itself, so unit tests inside the
//! library can use them.

mod fixtures;

pub use fixtures::*;
