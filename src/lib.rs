//! # medinfer
//!
//! HTTP inference service for pre-trained disease-classification models.
//!
//! ## Architecture
//!
//! A fixed registry of classifiers is loaded once at startup and shared
//! read-only with every request handler:
//! ```text
//! JSON body → field schema → feature vector → classifier → display label
//! ```
//!
//! One POST endpoint per disease model. Each request is a single atomic
//! input→output transformation with no intermediate state.

// ── Lint policy (aerospace-grade) ─────────────────────────────────────────
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(missing_docs)]

use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod metrics;
pub mod model;
pub mod registry;
pub mod schema;
pub mod server;
pub mod vocab;

// Re-exports for convenience
pub use model::{Classifier, FixedClassifier, GbdtClassifier};
pub use registry::{ModelKey, ModelRegistry};

/// Initialise the global tracing subscriber.
///
/// Reads the `LOG_FORMAT` environment variable to choose output format:
/// - `"json"` — structured JSON output for production log aggregators
///   (Datadog, Grafana Loki, etc.)
/// - anything else (including unset) — human-readable pretty output
///   for local development
///
/// Filter level is controlled by `RUST_LOG` (e.g. `RUST_LOG=info`).
///
/// # Errors
///
/// Returns [`MedinferError::Other`] if the global subscriber has already
/// been set (e.g. by a previous call or a test harness).
///
/// # Panics
///
/// This function never panics.
///
/// # Example
///
/// ```no_run
/// # use medinfer::{init_tracing, MedinferError};
/// # fn example() -> Result<(), MedinferError> {
/// init_tracing()?;
/// # Ok(()) }
/// ```
pub fn init_tracing() -> Result<(), MedinferError> {
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let result = match format.as_str() {
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .with_current_span(true)
            .with_span_list(true)
            .try_init(),
        _ => tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init(),
    };

    result.map_err(|e| MedinferError::Other(format!("tracing init failed: {e}")))
}

/// Top-level service errors.
///
/// Every error surface in the service is mapped to a variant here.
/// All variants implement `std::error::Error` via [`thiserror`].
#[derive(Error, Debug)]
pub enum MedinferError {
    /// A request value is malformed (wrong JSON type, unusable field).
    ///
    /// Always a caller error; surfaced as HTTP 400.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A predicted class index falls outside the disease class list.
    #[error("class index {index} out of range for {len} disease classes")]
    OutOfRange {
        /// The label produced by the classifier.
        index: i64,
        /// Number of known disease classes.
        len: usize,
    },

    /// A classifier invocation failed (shape mismatch, unusable score).
    ///
    /// Never retried — classifier invocation is deterministic and
    /// stateless, so the same input would fail the same way.
    #[error("prediction failed: {0}")]
    Prediction(String),

    /// A model artifact could not be loaded from disk.
    ///
    /// This is returned at startup so that a broken artifact surfaces
    /// immediately rather than at the first prediction request.
    #[error("failed to load model '{model}': {reason}")]
    ModelLoad {
        /// Registry key of the model that failed to load.
        model: String,
        /// Underlying loader error, stringified.
        reason: String,
    },

    /// A model key was requested that the registry never loaded.
    ///
    /// Indicates a wiring bug or a registry assembled without that model,
    /// not a caller error; surfaced as HTTP 500.
    #[error("model '{0}' is not loaded")]
    ModelUnavailable(String),

    /// A configuration value is missing or invalid (e.g., bad env var).
    #[error("configuration error: {0}")]
    Config(String),

    /// Catch-all for errors that do not fit a specific variant.
    #[error("{0}")]
    Other(String),
}

/// Human-readable name for a JSON value's type.
///
/// Used in [`MedinferError::InvalidInput`] messages so that callers see
/// *what* they sent ("boolean", "number") rather than a serde internals
/// dump.
///
/// # Panics
///
/// This function never panics.
///
/// # Example
///
/// ```rust
/// use medinfer::json_type_name;
/// assert_eq!(json_type_name(&serde_json::json!(42)), "number");
/// assert_eq!(json_type_name(&serde_json::Value::Null), "null");
/// ```
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_type_name_covers_all_variants() {
        use serde_json::json;
        assert_eq!(json_type_name(&serde_json::Value::Null), "null");
        assert_eq!(json_type_name(&json!(true)), "boolean");
        assert_eq!(json_type_name(&json!(1.5)), "number");
        assert_eq!(json_type_name(&json!("x")), "string");
        assert_eq!(json_type_name(&json!([1])), "array");
        assert_eq!(json_type_name(&json!({"a": 1})), "object");
    }

    #[test]
    fn test_out_of_range_display_includes_index_and_len() {
        let err = MedinferError::OutOfRange { index: 99, len: 41 };
        let msg = err.to_string();
        assert!(msg.contains("99"));
        assert!(msg.contains("41"));
    }

    #[test]
    fn test_model_load_display_includes_model_name() {
        let err = MedinferError::ModelLoad {
            model: "diabetes".to_string(),
            reason: "no such file".to_string(),
        };
        assert!(err.to_string().contains("diabetes"));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_config_error_display_includes_message() {
        let err = MedinferError::Config("PORT is not a number".to_string());
        assert!(err.to_string().contains("PORT is not a number"));
    }

    #[test]
    fn test_init_tracing_second_call_returns_err() {
        // First call may succeed or fail depending on test execution order
        // (another test may have already installed a subscriber).
        let _ = init_tracing();
        // Second call must not panic — it should return Err.
        let result = init_tracing();
        assert!(result.is_err(), "double init must return Err, not panic");
    }
}
