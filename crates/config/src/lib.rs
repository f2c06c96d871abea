//! Configuration loading, env substitution, and validation.
//!
//! Config files: `palaver.toml`, `palaver.yaml`, `palaver.yml` or `palaver.json`.
//! Searched in `./` then `~/.config/palaver/`.
//!
//! Supports `${ENV_VAR}` substitution anywhere in the raw file.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, discover_and_load, find_config_file, load_config, load_or_discover},
    schema::{AmbientConfig, BotConfig, PalaverConfig, RoutingConfig, StoreBackend, StoreConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
