// rest_api/src/lib.rs

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use thiserror::Error;
use anyhow::Context;
use anyhow::Error as AnyhowError;
use log::{info, warn};

use ml::encoding::FEATURE_COLUMNS;
use ml::model::WaitTimeModel;
use models::{PatientContext, SchedulerError, ValidationError};

pub mod config;
pub use crate::config::{load_rest_api_config, RestApiConfig};

/// Version reported by the root and info endpoints.
pub const API_VERSION: &str = "1.0.0";

// Define the REST API error enum
#[derive(Debug, Error)]
pub enum RestApiError {
    #[error("validation failed: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Validation(Vec<ValidationError>),
    #[error("unknown {field} value '{value}'")]
    UnknownCategory { field: String, value: String },
    #[error("model artifacts are not loaded; train a model and restart the server")]
    ModelUnavailable,
    #[error("prediction failed: {0}")]
    Prediction(String),
}

// Category mistakes are client errors; everything else from the model layer
// is a server-side prediction failure.
impl From<SchedulerError> for RestApiError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::UnknownCategory { field, value } => {
                RestApiError::UnknownCategory { field, value }
            }
            other => RestApiError::Prediction(other.to_string()),
        }
    }
}

// Implement IntoResponse for RestApiError to convert it into an HTTP response
impl IntoResponse for RestApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            RestApiError::Validation(violations) => {
                let details: Vec<String> =
                    violations.iter().map(ToString::to_string).collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({
                        "status": "error",
                        "message": "validation failed",
                        "errors": details,
                    }),
                )
            }
            RestApiError::UnknownCategory { ref field, ref value } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "status": "error",
                    "message": format!("unknown {} value '{}'", field, value),
                }),
            ),
            RestApiError::ModelUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({
                    "status": "error",
                    "message": self.to_string(),
                }),
            ),
            RestApiError::Prediction(ref message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "status": "error",
                    "message": format!("prediction failed: {}", message),
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

// Shared state for the Axum application
#[derive(Clone)]
pub struct AppState {
    model: Option<Arc<WaitTimeModel>>,
}

impl AppState {
    /// Builds state by loading artifacts from `model_directory`. A load
    /// failure leaves the API up and serving health plus error responses
    /// instead of aborting startup.
    pub fn load(model_directory: &Path) -> Self {
        match WaitTimeModel::load(model_directory) {
            Ok(model) => {
                info!(
                    "Loaded wait-time model from {}",
                    model_directory.display()
                );
                AppState {
                    model: Some(Arc::new(model)),
                }
            }
            Err(e) => {
                warn!(
                    "Failed to load model artifacts from {}: {}. Serving without a model.",
                    model_directory.display(),
                    e
                );
                AppState { model: None }
            }
        }
    }

    pub fn with_model(model: WaitTimeModel) -> Self {
        AppState {
            model: Some(Arc::new(model)),
        }
    }

    pub fn without_model() -> Self {
        AppState { model: None }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    fn model(&self) -> Result<&Arc<WaitTimeModel>, RestApiError> {
        self.model.as_ref().ok_or(RestApiError::ModelUnavailable)
    }
}

/// Successful prediction payload, echoing the request it answers.
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub predicted_wait_time_minutes: f64,
    pub input_data: PatientContext,
    pub status: String,
}

// Handler for the / endpoint
async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Hospital Wait Time Prediction API",
        "version": API_VERSION,
        "endpoints": {
            "health": "/health",
            "predict": "/predict",
            "predict_batch": "/predict/batch",
            "model_info": "/model/info",
            "departments": "/departments",
            "priorities": "/priorities",
        },
    }))
}

// Handler for the /health and /healthz endpoints. Always 200; a missing
// model shows up in the body, not the status code.
async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "model_loaded": state.model_loaded(),
        "api_version": API_VERSION,
    }))
}

// Handler for the /model/info endpoint
async fn model_info_handler(State(state): State<AppState>) -> Result<Json<Value>, RestApiError> {
    let model = state.model()?;
    Ok(Json(json!({
        "model_type": model.model_type(),
        "features": FEATURE_COLUMNS,
        "metrics": { "wait_time": model.metrics() },
        "trained_at": model.trained_at().to_rfc3339(),
        "status": "loaded",
    })))
}

// Handler for the /predict endpoint
async fn predict_handler(
    State(state): State<AppState>,
    Json(payload): Json<PatientContext>,
) -> Result<Json<PredictionResponse>, RestApiError> {
    payload.validate().map_err(RestApiError::Validation)?;
    let model = state.model()?;
    let minutes = model.predict_wait_time(&payload)?;

    info!(
        "Predicted {:.2} minute wait for {} / {}",
        minutes, payload.department, payload.priority
    );
    Ok(Json(PredictionResponse {
        predicted_wait_time_minutes: minutes,
        input_data: payload,
        status: "success".to_string(),
    }))
}

// Handler for the /predict/batch endpoint. Items are deserialized one by one
// so a malformed or invalid element becomes an error entry at its position
// instead of failing the whole request.
async fn predict_batch_handler(
    State(state): State<AppState>,
    Json(payload): Json<Vec<Value>>,
) -> Result<Json<Vec<Value>>, RestApiError> {
    let model = state.model()?;
    info!("Batch prediction request with {} items", payload.len());

    let results = payload
        .into_iter()
        .map(|item| predict_batch_item(model, item))
        .collect();
    Ok(Json(results))
}

fn predict_batch_item(model: &WaitTimeModel, item: Value) -> Value {
    let context: PatientContext = match serde_json::from_value(item.clone()) {
        Ok(context) => context,
        Err(e) => {
            return json!({
                "status": "error",
                "message": format!("malformed item: {}", e),
                "input_data": item,
            })
        }
    };

    if let Err(violations) = context.validate() {
        let details: Vec<String> = violations.iter().map(ToString::to_string).collect();
        return json!({
            "status": "error",
            "message": "validation failed",
            "errors": details,
            "input_data": item,
        });
    }

    match model.predict_wait_time(&context) {
        Ok(minutes) => json!({
            "predicted_wait_time_minutes": minutes,
            "input_data": context,
            "status": "success",
        }),
        Err(e) => json!({
            "status": "error",
            "message": e.to_string(),
            "input_data": item,
        }),
    }
}

// Handler for the /departments endpoint. The list comes from the trained
// vocabulary, never from hardcoded constants.
async fn departments_handler(State(state): State<AppState>) -> Result<Json<Value>, RestApiError> {
    let model = state.model()?;
    Ok(Json(json!({
        "departments": model.vocabulary().classes("department"),
    })))
}

// Handler for the /priorities endpoint
async fn priorities_handler(State(state): State<AppState>) -> Result<Json<Value>, RestApiError> {
    let model = state.model()?;
    Ok(Json(json!({
        "priorities": model.vocabulary().classes("priority"),
    })))
}

/// Builds the application router with CORS applied.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/healthz", get(health_handler))
        .route("/model/info", get(model_info_handler))
        .route("/predict", post(predict_handler))
        .route("/predict/batch", post(predict_batch_handler))
        .route("/departments", get(departments_handler))
        .route("/priorities", get(priorities_handler))
        .with_state(state)
        .layer(cors)
}

// Main function to start the REST API server
pub async fn start_server(
    config: RestApiConfig,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<(), AnyhowError> {
    let state = AppState::load(&config.model_directory);
    let app = app_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context(format!("Invalid listen address {}:{}", config.host, config.port))?;
    info!("Wait-time prediction API listening on {}", addr);

    let shutdown_signal = async {
        tokio::select! {
            _ = shutdown_rx => {
                info!("Received external shutdown signal.");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl-C, shutting down.");
            }
        }
    };

    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to address: {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("REST API server failed to start or run")?;

    info!("REST API server stopped.");
    Ok(())
}
