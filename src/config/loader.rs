//! Configuration file loading.
//!
//! ## Responsibility
//! Read a TOML file from disk, parse it into a [`ServiceConfig`], run
//! validation, and apply environment overrides. This is the primary entry
//! point for loading service configuration at startup.
//!
//! ## Guarantees
//! - A successfully loaded config is always validated
//! - I/O errors and parse errors are distinguished in the error type
//! - File path is included in every error message
//! - Environment overrides (`PORT`, `HOST`, `MEDINFER_MODEL_DIR`) win over
//!   file values, matching how the service is deployed
//!
//! ## NOT Responsible For
//! - Defining the config schema (that belongs to `mod.rs`)
//! - Semantic validation rules (that belongs to `validation`)

use std::path::Path;

use super::validation::{self, ConfigError};
use super::ServiceConfig;

/// Environment variable overriding the listen port.
pub const ENV_PORT: &str = "PORT";

/// Environment variable overriding the listen host.
pub const ENV_HOST: &str = "HOST";

/// Environment variable overriding the model artifact directory.
pub const ENV_MODEL_DIR: &str = "MEDINFER_MODEL_DIR";

/// Load a [`ServiceConfig`] from a TOML file.
///
/// Reads the file, parses it as TOML, and validates all semantic
/// constraints. Environment overrides are **not** applied here; see
/// [`load`].
///
/// # Arguments
///
/// * `path` — Path to the TOML configuration file.
///
/// # Returns
///
/// - `Ok(ServiceConfig)` if the file is readable, well-formed, and valid.
/// - `Err(ConfigError::Io)` if the file cannot be read.
/// - `Err(ConfigError::Parse)` if the TOML is malformed.
/// - `Err(ConfigError::Validation)` if semantic constraints are violated.
///
/// # Panics
///
/// This function never panics.
pub fn load_from_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        file: path.display().to_string(),
        source: e,
    })?;

    load_from_str(&content, &path.display().to_string())
}

/// Load a [`ServiceConfig`] from a TOML string.
///
/// Useful for testing or embedding configs without file I/O.
///
/// # Arguments
///
/// * `content` — TOML content as a string.
/// * `source_name` — Identifier for the source (used in error messages).
///
/// # Returns
///
/// - `Ok(ServiceConfig)` if the TOML is well-formed and valid.
/// - `Err(ConfigError::Parse)` if the TOML is malformed.
/// - `Err(ConfigError::Validation)` if semantic constraints are violated.
///
/// # Panics
///
/// This function never panics.
pub fn load_from_str(content: &str, source_name: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
        file: source_name.to_string(),
        source: e,
    })?;

    validation::validate(&config).map_err(|errors| {
        ConfigError::Validation(
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    })?;

    Ok(config)
}

/// Load the effective startup configuration.
///
/// With a path: file values, then environment overrides. Without a path:
/// defaults, then environment overrides. The result is re-validated after
/// overrides so a bad `PORT` value fails startup the same way a bad file
/// would.
///
/// # Errors
///
/// Any [`ConfigError`] from file loading, plus
/// [`ConfigError::Validation`] for unusable override values.
///
/// # Panics
///
/// This function never panics.
pub fn load(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(p) => load_from_file(p)?,
        None => ServiceConfig::default(),
    };

    apply_overrides(
        &mut config,
        std::env::var(ENV_PORT).ok().as_deref(),
        std::env::var(ENV_HOST).ok().as_deref(),
        std::env::var(ENV_MODEL_DIR).ok().as_deref(),
    )?;

    validation::validate(&config).map_err(|errors| {
        ConfigError::Validation(
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    })?;

    Ok(config)
}

/// Apply explicit override values onto a config.
///
/// Separated from environment access so the override logic is testable
/// without process-global state.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] if `port` is present but not a
/// valid TCP port number.
///
/// # Panics
///
/// This function never panics.
pub fn apply_overrides(
    config: &mut ServiceConfig,
    port: Option<&str>,
    host: Option<&str>,
    model_dir: Option<&str>,
) -> Result<(), ConfigError> {
    if let Some(raw) = port {
        let parsed: u16 = raw.parse().map_err(|_| {
            ConfigError::Validation(format!("{ENV_PORT}='{raw}' is not a valid TCP port"))
        })?;
        config.server.port = parsed;
    }

    if let Some(host) = host {
        config.server.host = host.to_string();
    }

    if let Some(dir) = model_dir {
        config.models.dir = dir.to_string();
    }

    Ok(())
}
