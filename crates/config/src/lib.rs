//! Configuration loading, validation and env substitution.
//!
//! Config files: `netreg.toml`, `netreg.yaml`, `netreg.yml` or `netreg.json`.
//! Searched in `./` then the user config directory (`~/.config/netreg/` on
//! Linux).
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw
//! file before parsing.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, discover_and_load, find_config_file, load_config},
    schema::{
        AcceptPolicy, ChannelConfig, HandshakeConfig, LoginPayloadConfig, ManifestFormat,
        MetricsConfig, NetregConfig, PayloadEncoding,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate, validate_config},
};
