use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::domain::discovery::{DiscoveryOutcome, DiscoveryScope};
use crate::domain::error::FactoryError;
use crate::domain::execution::{ExecutionMode, ExecutionRun};
use crate::domain::inventory::{Inventory, Server};
use crate::domain::planner::{Wave, WavePlan, WaveStrategy};
use crate::domain::replication::ReplicationBatch;
use crate::domain::report::{Report, ReportInput};
use crate::domain::service::MigrationService;

/// Shared application state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MigrationService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/v1/discover", post(discover))
        .route("/api/v1/waves", post(create_waves))
        .route("/api/v1/replication", post(setup_replication))
        .route("/api/v1/execute", post(execute_wave))
        .route("/api/v1/report", post(generate_report))
        .with_state(state)
}

/// Fixed error envelope: machine-readable code plus a human message.
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<FactoryError> for ApiError {
    fn from(err: FactoryError) -> Self {
        let status = match err {
            FactoryError::Validation(_) => StatusCode::BAD_REQUEST,
            FactoryError::Planning(_) | FactoryError::Reporting(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            FactoryError::Discovery(_) | FactoryError::Execution(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "service": "caravan migration factory",
        "available_endpoints": [
            "/api/v1/discover",
            "/api/v1/waves",
            "/api/v1/replication",
            "/api/v1/execute",
            "/api/v1/report",
        ],
    }))
}

#[derive(Serialize)]
struct HealthInfo {
    version: &'static str,
    status: &'static str,
}

async fn health() -> Json<HealthInfo> {
    Json(HealthInfo {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

#[derive(Debug, Deserialize)]
struct DiscoverRequest {
    #[serde(default)]
    scope: DiscoveryScope,
}

async fn discover(
    State(state): State<AppState>,
    Json(req): Json<DiscoverRequest>,
) -> Result<Json<DiscoveryOutcome>, ApiError> {
    state.service.discover(&req.scope).map(Json).map_err(Into::into)
}

#[derive(Debug, Deserialize)]
struct CreateWavesRequest {
    servers: Vec<Server>,
    #[serde(default)]
    strategy: WaveStrategy,
    /// Plan start; defaults to the time of the request.
    start: Option<DateTime<Utc>>,
}

async fn create_waves(
    State(state): State<AppState>,
    Json(req): Json<CreateWavesRequest>,
) -> Result<Json<WavePlan>, ApiError> {
    let inventory = Inventory::new(req.servers);
    let start = req.start.unwrap_or_else(Utc::now);
    state
        .service
        .plan(&inventory, req.strategy, start)
        .map(Json)
        .map_err(Into::into)
}

#[derive(Debug, Deserialize)]
struct ReplicationRequest {
    servers: Vec<Server>,
}

async fn setup_replication(
    State(state): State<AppState>,
    Json(req): Json<ReplicationRequest>,
) -> Result<Json<ReplicationBatch>, ApiError> {
    state
        .service
        .setup_replication(&req.servers)
        .map(Json)
        .map_err(Into::into)
}

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    wave: Wave,
    #[serde(default)]
    mode: ExecutionMode,
}

async fn execute_wave(
    State(state): State<AppState>,
    Json(req): Json<ExecuteRequest>,
) -> Json<ExecutionRun> {
    // Phase failures are reported on the run itself, not as an error.
    Json(state.service.execute(&req.wave, req.mode))
}

async fn generate_report(
    State(state): State<AppState>,
    Json(input): Json<ReportInput>,
) -> Result<Json<Report>, ApiError> {
    state.service.report(&input).map(Json).map_err(Into::into)
}
