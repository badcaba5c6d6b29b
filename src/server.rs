//! Dashboard JSON API.
//!
//! A thin transport layer over [`LakeManager`]: zone summaries, asset
//! search, lineage read-back, and sample-data generation. The core modules
//! know nothing about HTTP; status codes are decided here from the error
//! taxonomy.

use crate::config::MedallionConfig;
use crate::error::{MedallionError, Result};
use crate::manager::LakeManager;
use crate::{observability, sample};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

struct AppState {
    manager: LakeManager,
    metrics: PrometheusHandle,
}

/// Runs the dashboard server until the process is stopped.
pub async fn run_server(config: &MedallionConfig, manager: LakeManager) -> Result<()> {
    let metrics = observability::install_metrics_recorder()?;
    let app = router(Arc::new(AppState { manager, metrics }));

    let listener = TcpListener::bind(config.server.bind_addr).await?;
    info!(addr = %config.server.bind_addr, "Dashboard server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| MedallionError::Network(e.to_string()))?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/metrics", get(render_metrics))
        .route("/zone_summary", get(zone_summary))
        .route("/assets", get(list_assets))
        .route("/assets/{id}", get(get_asset))
        .route("/assets/{id}/lineage", get(get_lineage))
        .route("/search", get(search_assets))
        .route("/generate_sample", post(generate_sample))
        .with_state(state)
}

async fn render_metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.render()
}

async fn zone_summary(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Response, ApiError> {
    let summary = state.manager.zone_summary()?;
    Ok(Json(summary).into_response())
}

async fn list_assets(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Response, ApiError> {
    let assets = state.manager.catalog().search_assets("", &[])?;
    observability::record_search();
    Ok(Json(assets).into_response())
}

async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> std::result::Result<Response, ApiError> {
    let asset = state
        .manager
        .catalog()
        .get_asset(&id)?
        .ok_or(MedallionError::AssetNotFound(id))?;
    Ok(Json(asset).into_response())
}

async fn get_lineage(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> std::result::Result<Response, ApiError> {
    let edges = state.manager.catalog().lineage_of(&id)?;
    Ok(Json(edges).into_response())
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    /// Comma-separated tag filters.
    tags: Option<String>,
}

async fn search_assets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> std::result::Result<Response, ApiError> {
    let tags: Vec<String> = params
        .tags
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    let assets = state.manager.catalog().search_assets(&params.q, &tags)?;
    observability::record_search();
    Ok(Json(assets).into_response())
}

async fn generate_sample(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Response, ApiError> {
    let asset_ids = sample::generate(&state.manager)?;
    Ok(Json(json!({
        "message": "Sample data generated successfully",
        "asset_ids": asset_ids,
    }))
    .into_response())
}

/// Error wrapper mapping the lake taxonomy onto HTTP status codes.
struct ApiError(MedallionError);

impl From<MedallionError> for ApiError {
    fn from(e: MedallionError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            MedallionError::AssetNotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
