//! Service configuration
//!
//! ## Responsibility
//! Parse and validate TOML service configuration: listen address, request
//! limits, model artifact locations, and observability settings. Users run
//! the service with:
//! ```text
//! cargo run -- --config medinfer.toml
//! ```
//! or with no file at all — every field has a documented default, and the
//! `PORT`, `HOST`, and `MEDINFER_MODEL_DIR` environment variables override
//! the file.
//!
//! ## Guarantees
//! - Deterministic: same TOML input always produces the same `ServiceConfig`
//! - Validated: all semantic constraints are checked before a config is accepted
//! - Type-safe: invalid field combinations are caught at parse time via serde
//!
//! ## NOT Responsible For
//! - Loading model artifacts (that belongs to `registry`)
//! - Serving HTTP (that belongs to `server`)

pub mod loader;
pub mod validation;

use std::collections::HashMap;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::Objective;
use crate::registry::ModelKey;
use crate::MedinferError;

// ── Default value functions ──────────────────────────────────────────────

/// Default listen host: all interfaces.
fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default listen port: 5000.
fn default_port() -> u16 {
    5000
}

/// Default maximum request body size: 1 MiB.
fn default_max_request_size() -> usize {
    1024 * 1024
}

/// Default model artifact directory.
fn default_model_dir() -> String {
    "models".to_string()
}

/// Default log format: human-readable pretty output.
fn default_log_format() -> String {
    "pretty".to_string()
}

// ── Top-level config ─────────────────────────────────────────────────────

/// Root configuration for a service instance.
///
/// Deserialized from a TOML file and validated before use.
/// Every field has a documented default.
///
/// # Example
///
/// ```toml
/// [server]
/// port = 5000
///
/// [models]
/// dir = "models"
///
/// [models.general_disease]
/// file = "general_disease_xgb.model"
/// objective = "multi:softmax"
/// ```
///
/// # Panics
///
/// This type never panics during construction or access.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,
    /// Model artifact locations and objectives.
    #[serde(default)]
    pub models: ModelsSection,
    /// Logging settings.
    #[serde(default)]
    pub observability: ObservabilitySection,
}

// ── Server ───────────────────────────────────────────────────────────────

/// HTTP listener settings.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ServerSection {
    /// IP address or hostname to bind to (`"0.0.0.0"` for all interfaces).
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port the server listens on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum allowed request body size in bytes.
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_request_size: default_max_request_size(),
        }
    }
}

// ── Models ───────────────────────────────────────────────────────────────

/// Model artifact locations and objectives.
///
/// Per-model overrides live in `[models.<key>]` tables; any model without
/// an override uses `<key>.model` under `dir` with the key's default
/// objective.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ModelsSection {
    /// Directory holding the model artifacts.
    #[serde(default = "default_model_dir")]
    pub dir: String,
    /// Per-model overrides, keyed by model key string.
    #[serde(flatten)]
    pub entries: HashMap<String, ModelEntry>,
}

impl Default for ModelsSection {
    fn default() -> Self {
        Self {
            dir: default_model_dir(),
            entries: HashMap::new(),
        }
    }
}

impl ModelsSection {
    /// Resolve the artifact path and objective for a model key.
    ///
    /// # Errors
    ///
    /// Returns [`MedinferError::Config`] if the entry's objective string is
    /// unknown.
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn resolve(&self, key: ModelKey) -> Result<(PathBuf, Objective), MedinferError> {
        let entry = self.entries.get(key.as_str());

        let file = entry
            .and_then(|e| e.file.clone())
            .unwrap_or_else(|| key.default_file());

        let objective = match entry.and_then(|e| e.objective.as_deref()) {
            Some(s) => s.parse()?,
            None => key.default_objective(),
        };

        Ok((PathBuf::from(&self.dir).join(file), objective))
    }
}

/// Per-model artifact override.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct ModelEntry {
    /// Artifact file name, relative to `models.dir`. `None` uses
    /// `<key>.model`.
    pub file: Option<String>,
    /// xgboost objective the artifact was trained with. `None` uses the
    /// model key's default.
    pub objective: Option<String>,
}

// ── Observability ────────────────────────────────────────────────────────

/// Logging settings.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ObservabilitySection {
    /// Log output format: `"pretty"` or `"json"`.
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilitySection {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_binds_all_interfaces_on_5000() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.max_request_size, 1024 * 1024);
    }

    #[test]
    fn test_default_config_uses_models_dir() {
        let config = ServiceConfig::default();
        assert_eq!(config.models.dir, "models");
        assert!(config.models.entries.is_empty());
    }

    #[test]
    fn test_resolve_without_entry_uses_key_defaults() {
        let models = ModelsSection::default();
        let (path, objective) = models.resolve(ModelKey::Diabetes).unwrap();
        assert_eq!(path, PathBuf::from("models").join("diabetes.model"));
        assert_eq!(objective, Objective::BinaryLogistic);

        let (path, objective) = models.resolve(ModelKey::GeneralDisease).unwrap();
        assert_eq!(path, PathBuf::from("models").join("general_disease.model"));
        assert_eq!(objective, Objective::MultiSoftmax);
    }

    #[test]
    fn test_resolve_honours_entry_overrides() {
        let mut models = ModelsSection {
            dir: "artifacts".to_string(),
            entries: HashMap::new(),
        };
        models.entries.insert(
            "diabetes".to_string(),
            ModelEntry {
                file: Some("diabetes_v2.model".to_string()),
                objective: Some("multi:softmax".to_string()),
            },
        );

        let (path, objective) = models.resolve(ModelKey::Diabetes).unwrap();
        assert_eq!(path, PathBuf::from("artifacts").join("diabetes_v2.model"));
        assert_eq!(objective, Objective::MultiSoftmax);
    }

    #[test]
    fn test_resolve_rejects_unknown_objective() {
        let mut models = ModelsSection::default();
        models.entries.insert(
            "heart".to_string(),
            ModelEntry {
                file: None,
                objective: Some("rank:pairwise".to_string()),
            },
        );

        let err = models.resolve(ModelKey::Heart).unwrap_err();
        assert!(matches!(err, MedinferError::Config(_)));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = ServiceConfig::default();
        let text = toml::to_string(&config).unwrap();
        let restored: ServiceConfig = toml::from_str(&text).unwrap();
        assert_eq!(restored, config);
    }
}
