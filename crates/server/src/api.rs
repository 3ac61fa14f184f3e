//! Read API over the recommendation pipeline plus Prometheus metrics
//!
//! Every request runs a fresh pipeline; nothing is cached between calls.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use optimizer_lib::{
    alerts::BudgetMonitor,
    engine::OptimizationEngine,
    report::{save_cost_report, ReportStore},
    BudgetEvaluation, OptimizationReport, OptimizationSummary, OptimizerError, Recommendation,
    RightsizingEntry, RightsizingRecommendation, SavingsRecord, ServiceCostRecord,
    StructuredLogger,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Shared application state
pub struct AppState {
    pub engine: Arc<OptimizationEngine>,
    pub budget: Arc<BudgetMonitor>,
    pub reports: Arc<dyn ReportStore>,
    /// Region reported in budget evaluations that name none
    pub default_region: String,
}

impl AppState {
    pub fn new(
        engine: Arc<OptimizationEngine>,
        budget: Arc<BudgetMonitor>,
        reports: Arc<dyn ReportStore>,
        default_region: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            budget,
            reports,
            default_region: default_region.into(),
        }
    }
}

/// Request failure rendered as `{"error": "..."}`
pub enum ApiError {
    /// The request itself could not be understood
    BadRequest(String),
    Pipeline(OptimizerError),
}

impl From<OptimizerError> for ApiError {
    fn from(err: OptimizerError) -> Self {
        Self::Pipeline(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "bad_request", message),
            ApiError::Pipeline(err) => {
                let status = match &err {
                    OptimizerError::Transport(_) => StatusCode::BAD_GATEWAY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.kind(), err.to_string())
            }
        };

        StructuredLogger::new("api").log_request_failed(kind, &message);

        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct CostQuery {
    pub top: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceCostsResponse {
    pub services: Vec<ServiceCostRecord>,
    pub total_cost_usd: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct BudgetRequest {
    pub region: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedReport {
    pub key: String,
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "status": "API is running" }))
}

async fn idle_resources(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Recommendation>> {
    Ok(Json(state.engine.idle_recommendations().await?))
}

async fn rightsizing(State(state): State<Arc<AppState>>) -> ApiResult<Vec<RightsizingEntry>> {
    Ok(Json(state.engine.rightsizing().await?))
}

async fn savings(State(state): State<Arc<AppState>>) -> ApiResult<Vec<SavingsRecord>> {
    Ok(Json(state.engine.savings().await?))
}

async fn full_report(State(state): State<Arc<AppState>>) -> ApiResult<OptimizationReport> {
    Ok(Json(state.engine.full_report().await?))
}

async fn summary(State(state): State<Arc<AppState>>) -> ApiResult<OptimizationSummary> {
    let report = state.engine.full_report().await?;
    Ok(Json(report.summary()))
}

async fn service_costs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CostQuery>,
) -> ApiResult<ServiceCostsResponse> {
    let (services, total_cost_usd) = state.engine.service_costs(query.top).await?;
    Ok(Json(ServiceCostsResponse {
        services,
        total_cost_usd,
    }))
}

/// Flat rows for dashboards; the placeholder marker is dropped
async fn grafana_rightsizing(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<RightsizingRecommendation>> {
    let entries = state.engine.rightsizing().await?;
    Ok(Json(
        entries
            .iter()
            .map(|entry| entry.recommendation().clone())
            .collect(),
    ))
}

async fn evaluate_budget(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<BudgetEvaluation> {
    let request = parse_budget_request(&body)?;
    let region = request
        .region
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| state.default_region.clone());

    let total = state.engine.total_cost().await?;
    Ok(Json(state.budget.evaluate_cost(total, &region).await))
}

/// An empty body selects the default region; anything else must be valid JSON
fn parse_budget_request(body: &[u8]) -> Result<BudgetRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(BudgetRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid budget request: {}", e)))
}

async fn save_report(State(state): State<Arc<AppState>>) -> ApiResult<SavedReport> {
    let report = state.engine.full_report().await?;
    let key = save_cost_report(state.reports.as_ref(), &report, Utc::now().date_naive()).await?;
    Ok(Json(SavedReport { key }))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/idle-resources", get(idle_resources))
        .route("/rightsizing", get(rightsizing))
        .route("/savings", get(savings))
        .route("/full-report", get(full_report))
        .route("/summary", get(summary))
        .route("/service-costs", get(service_costs))
        .route("/grafana/idle", get(idle_resources))
        .route("/grafana/rightsizing", get(grafana_rightsizing))
        .route("/grafana/savings", get(savings))
        .route("/budget/evaluate", post(evaluate_budget))
        .route("/reports", post(save_report))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
