//! Prometheus metrics for the prediction service.
//!
//! ## Usage
//!
//! Call [`init_metrics`] once at process startup **before** serving any
//! request. The helper functions (`inc_request`, `observe_prediction`, …)
//! are no-ops if `init_metrics` was never called, so the service is always
//! safe to run — observability simply degrades gracefully.
//!
//! ## Metrics Exposed
//!
//! | Name | Type | Labels |
//! |------|------|--------|
//! | `medinfer_requests_total` | Counter | `endpoint` |
//! | `medinfer_errors_total` | Counter | `endpoint`, `kind` |
//! | `medinfer_prediction_duration_seconds` | Histogram | `model` |
//! | `medinfer_models_loaded` | Gauge | — |

use crate::MedinferError;
use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;
use std::time::Duration;

// ── Internal metrics bundle ────────────────────────────────────────────────

/// All Prometheus metrics for the service, bundled together so they can
/// be stored in a single [`OnceLock`] and initialised atomically.
pub struct Metrics {
    /// Prometheus registry that owns all metric descriptors.
    pub registry: Registry,
    /// Total requests processed per endpoint.
    pub requests_total: CounterVec,
    /// Errors by endpoint and error kind.
    pub errors_total: CounterVec,
    /// Classifier invocation latency histogram per model.
    pub prediction_duration: HistogramVec,
    /// Number of models loaded into the registry.
    pub models_loaded: IntGauge,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

// ── Initialisation ─────────────────────────────────────────────────────────

/// Initialise all Prometheus metrics and register them with a private
/// registry.
///
/// Must be called once at process startup before the server starts.
/// Calling it a second time is a no-op (returns `Ok(())`).
///
/// # Errors
///
/// Returns [`MedinferError::Other`] if metric construction or registry
/// registration fails (e.g., duplicate descriptor names).
///
/// # Panics
///
/// This function never panics.
pub fn init_metrics() -> Result<(), MedinferError> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let requests_total = CounterVec::new(
        Opts::new("medinfer_requests_total", "Total requests processed"),
        &["endpoint"],
    )
    .map_err(|e| MedinferError::Other(format!("metrics init failed: {e}")))?;
    registry
        .register(Box::new(requests_total.clone()))
        .map_err(|e| MedinferError::Other(format!("metrics registration failed: {e}")))?;

    let errors_total = CounterVec::new(
        Opts::new("medinfer_errors_total", "Errors by endpoint and kind"),
        &["endpoint", "kind"],
    )
    .map_err(|e| MedinferError::Other(format!("metrics init failed: {e}")))?;
    registry
        .register(Box::new(errors_total.clone()))
        .map_err(|e| MedinferError::Other(format!("metrics registration failed: {e}")))?;

    let prediction_duration = HistogramVec::new(
        HistogramOpts::new(
            "medinfer_prediction_duration_seconds",
            "Classifier invocation duration per model",
        ),
        &["model"],
    )
    .map_err(|e| MedinferError::Other(format!("metrics init failed: {e}")))?;
    registry
        .register(Box::new(prediction_duration.clone()))
        .map_err(|e| MedinferError::Other(format!("metrics registration failed: {e}")))?;

    let models_loaded = IntGauge::new("medinfer_models_loaded", "Models loaded in the registry")
        .map_err(|e| MedinferError::Other(format!("metrics init failed: {e}")))?;
    registry
        .register(Box::new(models_loaded.clone()))
        .map_err(|e| MedinferError::Other(format!("metrics registration failed: {e}")))?;

    // If another thread raced us, the first one wins — both initializations
    // produce identical metric descriptors, so neither outcome is incorrect.
    let _ = METRICS.set(Metrics {
        registry,
        requests_total,
        errors_total,
        prediction_duration,
        models_loaded,
    });

    Ok(())
}

/// Return a reference to the initialised [`Metrics`], or `None` if
/// [`init_metrics`] has not been called yet.
fn metrics() -> Option<&'static Metrics> {
    METRICS.get()
}

// ── Public helper functions ────────────────────────────────────────────────

/// Increment the request counter for an endpoint.
///
/// No-op if metrics have not been initialised.
///
/// # Panics
///
/// This function never panics.
pub fn inc_request(endpoint: &str) {
    if let Some(m) = metrics() {
        if let Ok(c) = m.requests_total.get_metric_with_label_values(&[endpoint]) {
            c.inc();
        }
    }
}

/// Increment the error counter for an endpoint and error kind.
///
/// No-op if metrics have not been initialised.
///
/// # Panics
///
/// This function never panics.
pub fn inc_error(endpoint: &str, kind: &str) {
    if let Some(m) = metrics() {
        if let Ok(c) = m
            .errors_total
            .get_metric_with_label_values(&[endpoint, kind])
        {
            c.inc();
        }
    }
}

/// Record the classifier invocation latency for a model.
///
/// No-op if metrics have not been initialised.
///
/// # Panics
///
/// This function never panics.
pub fn observe_prediction(model: &str, d: Duration) {
    if let Some(m) = metrics() {
        if let Ok(h) = m.prediction_duration.get_metric_with_label_values(&[model]) {
            h.observe(d.as_secs_f64());
        }
    }
}

/// Set the loaded-models gauge.
///
/// No-op if metrics have not been initialised.
///
/// # Panics
///
/// This function never panics.
pub fn set_models_loaded(count: i64) {
    if let Some(m) = metrics() {
        m.models_loaded.set(count);
    }
}

/// Gather all registered metrics as a raw list of metric families.
///
/// Returns an empty `Vec` if metrics have not been initialised.
///
/// # Panics
///
/// This function never panics.
pub fn gather() -> Vec<prometheus::proto::MetricFamily> {
    metrics().map_or_else(Vec::new, |m| m.registry.gather())
}

/// Gather and encode all metrics in the Prometheus text exposition format.
///
/// Returns an empty string if metrics have not been initialised or if
/// encoding fails. Observability degrades gracefully rather than panicking.
///
/// # Panics
///
/// This function never panics.
pub fn gather_metrics() -> String {
    let families = gather();
    if families.is_empty() {
        return String::new();
    }
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_metrics_is_idempotent() {
        init_metrics().expect("test: first init");
        init_metrics().expect("test: second init is a no-op");
    }

    #[test]
    fn test_helpers_after_init_show_up_in_exposition() {
        init_metrics().expect("test: init");
        inc_request("/api/diabetes");
        inc_error("/api/diabetes", "missing_field");
        observe_prediction("diabetes", Duration::from_millis(2));
        set_models_loaded(9);

        let text = gather_metrics();
        assert!(text.contains("medinfer_requests_total"));
        assert!(text.contains("medinfer_errors_total"));
        assert!(text.contains("medinfer_prediction_duration_seconds"));
        assert!(text.contains("medinfer_models_loaded"));
    }
}
