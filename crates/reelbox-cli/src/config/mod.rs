//! Application configuration module.
//!
//! Manages the TOML config file holding the catalog API key and
//! search tuning.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{API_KEY_ENV, AppConfig, mask_secret};
pub use paths::{resolve_config_path, resolve_log_path};
