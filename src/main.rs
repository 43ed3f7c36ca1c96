//! Service binary for medinfer
//!
//! Loads configuration, builds the model registry from on-disk artifacts,
//! and serves the prediction API.
//!
//! ## Usage
//!
//! ```text
//! medinfer [--config medinfer.toml]
//! ```
//!
//! ## Environment Variables
//!
//! - `PORT` — listen port (default: 5000)
//! - `HOST` — listen host (default: 0.0.0.0)
//! - `MEDINFER_MODEL_DIR` — model artifact directory (default: models)
//! - `LOG_FORMAT=json` — structured JSON output (production)
//! - `RUST_LOG=info` — log level filter

use std::path::PathBuf;

use medinfer::{config, init_tracing, metrics, server, MedinferError, ModelRegistry};
use tracing::info;

/// Extract the `--config <path>` argument, if given.
fn config_path_from_args() -> Result<Option<PathBuf>, MedinferError> {
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => match args.next() {
                Some(path) => return Ok(Some(PathBuf::from(path))),
                None => {
                    return Err(MedinferError::Config(
                        "--config requires a file path".to_string(),
                    ))
                }
            },
            other => {
                return Err(MedinferError::Config(format!(
                    "unrecognized argument '{other}'"
                )))
            }
        }
    }

    Ok(None)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing (JSON or pretty, based on LOG_FORMAT env)
    let _ = init_tracing();

    // Initialize Prometheus metrics registry before serving any request.
    metrics::init_metrics()?;

    let config_path = config_path_from_args()?;
    let config = config::loader::load(config_path.as_deref())
        .map_err(|e| MedinferError::Config(e.to_string()))?;

    info!(
        host = %config.server.host,
        port = config.server.port,
        model_dir = %config.models.dir,
        "Starting medinfer"
    );

    // Load all model artifacts eagerly — a broken artifact fails startup,
    // not the first request.
    let registry = ModelRegistry::load(&config.models)?;
    metrics::set_models_loaded(registry.len() as i64);

    info!(models = registry.len(), "Model registry loaded");

    server::start_server(&config.server, registry).await?;

    Ok(())
}
