//! Configuration validation engine.
//!
//! ## Responsibility
//! Validate semantic constraints on a parsed [`ServiceConfig`] that cannot
//! be expressed through the type system alone (range checks, known model
//! keys, known objectives).
//!
//! ## Guarantees
//! - Every validation rule has at least one test that triggers it
//! - Validation collects *all* errors before returning (no short-circuit)
//! - Error messages include the field path and the invalid value
//!
//! ## NOT Responsible For
//! - Parsing TOML (that belongs to `loader`)
//! - File I/O (that belongs to `loader`)

use std::str::FromStr;

use super::ServiceConfig;
use crate::model::Objective;
use crate::registry::ModelKey;

/// Errors arising from configuration parsing, validation, or I/O.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parsing failed.
    #[error("Parse error in {file}: {source}")]
    Parse {
        /// Path of the file that failed to parse.
        file: String,
        /// Underlying TOML deserialization error.
        #[source]
        source: toml::de::Error,
    },

    /// One or more semantic validation rules failed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A specific field has an out-of-range or contradictory value.
    #[error("Field '{field}' has invalid value {value}: {reason}")]
    InvalidField {
        /// Dot-separated field path (e.g., "server.port").
        field: String,
        /// String representation of the invalid value.
        value: String,
        /// Human-readable explanation of the constraint.
        reason: String,
    },

    /// File I/O error.
    #[error("IO error reading {file}: {source}")]
    Io {
        /// Path of the file that could not be read.
        file: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Validate all semantic constraints on a [`ServiceConfig`].
///
/// Collects every violation before returning so the caller sees the full
/// scope of issues at once.
///
/// # Arguments
///
/// * `config` — The parsed config to validate.
///
/// # Returns
///
/// - `Ok(())` if all constraints pass.
/// - `Err(Vec<ConfigError>)` with every violation found.
///
/// # Panics
///
/// This function never panics.
pub fn validate(config: &ServiceConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // ── Server ───────────────────────────────────────────────────────
    if config.server.port == 0 {
        errors.push(ConfigError::InvalidField {
            field: "server.port".into(),
            value: "0".into(),
            reason: "must be a non-zero TCP port".into(),
        });
    }

    if config.server.max_request_size == 0 {
        errors.push(ConfigError::InvalidField {
            field: "server.max_request_size".into(),
            value: "0".into(),
            reason: "must be at least 1 byte".into(),
        });
    }

    // ── Models ───────────────────────────────────────────────────────
    if config.models.dir.trim().is_empty() {
        errors.push(ConfigError::InvalidField {
            field: "models.dir".into(),
            value: format!("\"{}\"", config.models.dir),
            reason: "must name a directory".into(),
        });
    }

    for (name, entry) in &config.models.entries {
        if ModelKey::from_str(name).is_err() {
            errors.push(ConfigError::InvalidField {
                field: format!("models.{name}"),
                value: format!("\"{name}\""),
                reason: "is not a known model key".into(),
            });
        }

        if let Some(file) = &entry.file {
            if file.trim().is_empty() {
                errors.push(ConfigError::InvalidField {
                    field: format!("models.{name}.file"),
                    value: "\"\"".into(),
                    reason: "must name a file".into(),
                });
            }
        }

        if let Some(objective) = &entry.objective {
            if Objective::from_str(objective).is_err() {
                errors.push(ConfigError::InvalidField {
                    field: format!("models.{name}.objective"),
                    value: format!("\"{objective}\""),
                    reason: "must be 'binary:logistic' or 'multi:softmax'".into(),
                });
            }
        }
    }

    // ── Observability ────────────────────────────────────────────────
    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ConfigError::InvalidField {
            field: "observability.log_format".into(),
            value: format!("\"{}\"", config.observability.log_format),
            reason: "must be 'pretty' or 'json'".into(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelEntry;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_port_zero_is_rejected() {
        let mut config = ServiceConfig::default();
        config.server.port = 0;
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("server.port")));
    }

    #[test]
    fn test_zero_request_size_is_rejected() {
        let mut config = ServiceConfig::default();
        config.server.max_request_size = 0;
        let errors = validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("max_request_size")));
    }

    #[test]
    fn test_empty_model_dir_is_rejected() {
        let mut config = ServiceConfig::default();
        config.models.dir = "  ".into();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("models.dir")));
    }

    #[test]
    fn test_unknown_model_key_is_rejected() {
        let mut config = ServiceConfig::default();
        config
            .models
            .entries
            .insert("alzheimers".into(), ModelEntry::default());
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("alzheimers")));
    }

    #[test]
    fn test_unknown_objective_is_rejected() {
        let mut config = ServiceConfig::default();
        config.models.entries.insert(
            "heart".into(),
            ModelEntry {
                file: None,
                objective: Some("rank:pairwise".into()),
            },
        );
        let errors = validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("heart.objective")));
    }

    #[test]
    fn test_empty_artifact_file_is_rejected() {
        let mut config = ServiceConfig::default();
        config.models.entries.insert(
            "liver".into(),
            ModelEntry {
                file: Some("".into()),
                objective: None,
            },
        );
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("liver.file")));
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        let mut config = ServiceConfig::default();
        config.observability.log_format = "xml".into();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("log_format")));
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.server.port = 0;
        config.models.dir = "".into();
        config.observability.log_format = "xml".into();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
