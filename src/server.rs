//! Prediction API Server
//!
//! Provides the HTTP REST API, one POST endpoint per disease model.
//!
//! ## Endpoints
//!
//! ### Prediction
//! - `POST /api/diabetes` — Diabetes screening (8 fields)
//! - `POST /api/heart` — Heart disease screening (13 fields)
//! - `POST /api/parkinson` — Parkinson's screening (22 fields)
//! - `POST /api/lung_cancer` — Lung cancer screening (15 fields)
//! - `POST /api/breast_cancer` — Breast cancer screening (30 fields)
//! - `POST /api/chronic_kidney` — Chronic kidney disease screening (13 fields)
//! - `POST /api/hepatitis` — Hepatitis screening (12 fields)
//! - `POST /api/liver` — Liver disease screening (10 fields)
//! - `POST /api/general_disease` — Symptom-list disease prediction
//!
//! ### Utility
//! - `GET /health` — Health check
//! - `GET /metrics` — Prometheus metrics
//!
//! ## Contract
//!
//! Success → 200 `{"result": "<label>"}`. Missing or malformed field →
//! 400 `{"error": "..."}` (`Missing field: <name>` for absent fields).
//! Prediction failure, unmapped label, or out-of-range class → 500
//! `{"error": "..."}`. No error is retried; each request either fully
//! succeeds or fully fails with no side effects.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ServerSection;
use crate::registry::{ModelKey, ModelRegistry};
use crate::schema::{self, EndpointSpec, FieldError};
use crate::{json_type_name, metrics, vocab, MedinferError};

// ============================================================================
// State
// ============================================================================

/// Shared application state available to all handlers.
///
/// Holds the model registry, loaded once at startup and never mutated —
/// safe for concurrent read access by simultaneous requests with no
/// locking.
pub struct AppState {
    /// The fixed model registry.
    pub registry: ModelRegistry,
}

// ============================================================================
// Server
// ============================================================================

/// Start the prediction API server.
///
/// Binds to `config.host:config.port` and serves the REST API. Blocks
/// until the server shuts down.
///
/// # Errors
///
/// Returns [`MedinferError::Other`] if the address cannot be bound or the
/// server fails.
///
/// # Panics
///
/// This function never panics.
pub async fn start_server(
    config: &ServerSection,
    registry: ModelRegistry,
) -> Result<(), MedinferError> {
    let addr = format!("{}:{}", config.host, config.port);

    info!("Starting prediction API on http://{}", addr);

    let state = Arc::new(AppState { registry });
    let app = router(state, config.max_request_size);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MedinferError::Other(format!("failed to bind {addr}: {e}")))?;

    info!("Prediction API ready on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| MedinferError::Other(format!("server error: {e}")))?;

    Ok(())
}

/// Build the service router with all routes and middleware.
///
/// Separated from [`start_server`] so tests can assemble the full
/// application without binding a socket.
///
/// # Panics
///
/// This function never panics.
pub fn router(state: Arc<AppState>, max_request_size: usize) -> Router {
    Router::new()
        .route(schema::DIABETES.route, post(diabetes_handler))
        .route(schema::HEART.route, post(heart_handler))
        .route(schema::PARKINSON.route, post(parkinson_handler))
        .route(schema::LUNG_CANCER.route, post(lung_cancer_handler))
        .route(schema::BREAST_CANCER.route, post(breast_cancer_handler))
        .route(schema::CHRONIC_KIDNEY.route, post(chronic_kidney_handler))
        .route(schema::HEPATITIS.route, post(hepatitis_handler))
        .route(schema::LIVER.route, post(liver_handler))
        .route("/api/general_disease", post(general_disease_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(middleware::from_fn_with_state(
            max_request_size,
            body_size_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Middleware
// ============================================================================

/// Adds a unique `X-Request-ID` header to every response.
///
/// If the client sends an `X-Request-ID` header, it is preserved; otherwise
/// a new UUID v4 is generated.
///
/// # Panics
///
/// This function never panics.
async fn request_id_middleware(req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

/// Rejects requests whose `Content-Length` exceeds `max_size` with 413.
///
/// # Panics
///
/// This function never panics.
async fn body_size_middleware(
    State(max_size): State<usize>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(content_length) = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok())
    {
        if content_length > max_size {
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({"error": "Request body too large"})),
            )
                .into_response();
        }
    }

    next.run(req).await
}

// ============================================================================
// Tabular Prediction
// ============================================================================

/// Run one tabular prediction: validate fields, assemble the feature
/// vector, invoke the classifier, translate the label.
///
/// The whole transformation is synchronous — the classifier call is
/// in-memory, CPU-bound and fast.
fn predict_tabular(
    state: &AppState,
    spec: &EndpointSpec,
    body: &Value,
) -> Result<Json<Value>, ApiError> {
    let object = body.as_object().ok_or_else(|| {
        ApiError::InvalidInput(format!(
            "request body must be a JSON object, got {}",
            json_type_name(body)
        ))
    })?;

    let features = schema::extract_features(spec.fields, object)?;

    let classifier = state.registry.get(spec.key)?;
    let started = Instant::now();
    let label = classifier.predict(&features)?;
    metrics::observe_prediction(spec.key.as_str(), started.elapsed());

    let display = spec.labels.display(label).ok_or_else(|| {
        ApiError::Internal(format!(
            "model '{}' predicted unmapped label {label}",
            spec.key
        ))
    })?;

    Ok(Json(json!({"result": display})))
}

/// Shared tabular handler body: count the request, parse the JSON body,
/// predict, and count any error by kind.
fn tabular(
    state: &AppState,
    spec: &EndpointSpec,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    metrics::inc_request(spec.route);

    let outcome = body
        .map_err(|e| ApiError::InvalidInput(format!("invalid JSON body: {e}")))
        .and_then(|Json(value)| predict_tabular(state, spec, &value));

    if let Err(e) = &outcome {
        metrics::inc_error(spec.route, e.kind());
        warn!(endpoint = spec.route, error = %e.message(), "prediction request failed");
    }

    outcome
}

/// `POST /api/diabetes` — Diabetes screening.
async fn diabetes_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    tabular(&state, &schema::DIABETES, body)
}

/// `POST /api/heart` — Heart disease screening.
async fn heart_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    tabular(&state, &schema::HEART, body)
}

/// `POST /api/parkinson` — Parkinson's disease screening.
async fn parkinson_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    tabular(&state, &schema::PARKINSON, body)
}

/// `POST /api/lung_cancer` — Lung cancer screening.
async fn lung_cancer_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    tabular(&state, &schema::LUNG_CANCER, body)
}

/// `POST /api/breast_cancer` — Breast cancer screening.
async fn breast_cancer_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    tabular(&state, &schema::BREAST_CANCER, body)
}

/// `POST /api/chronic_kidney` — Chronic kidney disease screening.
async fn chronic_kidney_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    tabular(&state, &schema::CHRONIC_KIDNEY, body)
}

/// `POST /api/hepatitis` — Hepatitis screening.
async fn hepatitis_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    tabular(&state, &schema::HEPATITIS, body)
}

/// `POST /api/liver` — Liver disease screening.
async fn liver_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    tabular(&state, &schema::LIVER, body)
}

// ============================================================================
// General Disease Prediction
// ============================================================================

/// `POST /api/general_disease` — Symptom-list disease prediction.
///
/// Accepts `{"symptoms": [strings]}`, one-hot encodes the recognized
/// symptoms over the fixed vocabulary, and maps the predicted class index
/// back to a disease name. Unrecognized symptoms are silently ignored; an
/// out-of-range class index is an internal error.
async fn general_disease_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    const ROUTE: &str = "/api/general_disease";
    metrics::inc_request(ROUTE);

    let outcome: Result<Json<Value>, ApiError> = (|| {
        let Json(body) =
            body.map_err(|e| ApiError::InvalidInput(format!("invalid JSON body: {e}")))?;

        let symptoms = body
            .get("symptoms")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ApiError::InvalidInput(
                    "Missing or invalid field: symptoms (must be a list of strings)".to_string(),
                )
            })?;

        let features = vocab::encode_symptoms(symptoms)?;

        let classifier = state.registry.get(ModelKey::GeneralDisease)?;
        let started = Instant::now();
        let label = classifier.predict(&features)?;
        metrics::observe_prediction(ModelKey::GeneralDisease.as_str(), started.elapsed());

        let disease = vocab::decode_disease(label)?;
        Ok(Json(json!({"result": disease})))
    })();

    if let Err(e) = &outcome {
        metrics::inc_error(ROUTE, e.kind());
        warn!(endpoint = ROUTE, error = %e.message(), "prediction request failed");
    }

    outcome
}

// ============================================================================
// Utility Handlers
// ============================================================================

/// `GET /health` — Health check endpoint.
///
/// # Panics
///
/// This function never panics.
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "models": state.registry.len(),
    }))
}

/// `GET /metrics` — Prometheus metrics endpoint.
///
/// # Panics
///
/// This function never panics.
async fn metrics_handler() -> String {
    metrics::gather_metrics()
}

// ============================================================================
// Error Type
// ============================================================================

/// Application-level errors returned by API handlers.
///
/// Each variant maps to an HTTP status code and a JSON error body of the
/// form `{"error": message}`.
///
/// # Panics
///
/// This type never panics.
#[derive(Debug)]
enum ApiError {
    /// A required field is missing or not a number (caller error, 400).
    Field(FieldError),
    /// The request body or a value in it is malformed (caller error, 400).
    InvalidInput(String),
    /// Feature assembly or model invocation failed (500).
    Internal(String),
}

impl ApiError {
    /// The message placed in the JSON error body.
    fn message(&self) -> String {
        match self {
            ApiError::Field(e) => e.to_string(),
            ApiError::InvalidInput(msg) | ApiError::Internal(msg) => msg.clone(),
        }
    }

    /// Error kind label for metrics.
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Field(FieldError::Missing(_)) => "missing_field",
            ApiError::Field(FieldError::NotNumeric { .. }) | ApiError::InvalidInput(_) => {
                "invalid_input"
            }
            ApiError::Internal(_) => "internal",
        }
    }

    /// The HTTP status this error maps to.
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Field(_) | ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FieldError> for ApiError {
    fn from(e: FieldError) -> Self {
        ApiError::Field(e)
    }
}

impl From<MedinferError> for ApiError {
    fn from(e: MedinferError) -> Self {
        match e {
            MedinferError::InvalidInput(_) => ApiError::InvalidInput(e.to_string()),
            // OutOfRange, Prediction, ModelUnavailable, and the rest are
            // service-side failures.
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({"error": self.message()}))).into_response()
    }
}

// ============================================================================
// Tests
// ============================================================================
