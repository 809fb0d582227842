//! HTTP service mode
//!
//! `GET /api/check?rpc_url=<url>` runs the full check set against the given
//! node and returns the verdicts as JSON. Each request runs on its own task;
//! the only shared state is the immutable prober and config.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rollux_probe_core::{CheckResponse, NodeEndpoint, ProbeConfig, Prober};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub struct AppState {
    pub prober: Prober,
    pub config: ProbeConfig,
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    rpc_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

async fn api_check(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, ApiError> {
    let rpc_url = query
        .rpc_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| bad_request("RPC URL is required"))?;

    let target = NodeEndpoint::parse(&rpc_url).map_err(|e| bad_request(e.to_string()))?;

    let report = state.prober.run_checks(&target, &state.config).await;
    Ok(Json(CheckResponse::from(&report)))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/check", get(api_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(
    bind: &str,
    port: u16,
    prober: Prober,
    config: ProbeConfig,
) -> anyhow::Result<()> {
    info!("rollux-probe v{}", env!("CARGO_PKG_VERSION"));
    info!("  reference: {}", config.reference);
    info!("  ports: {:?}", config.ports);
    info!("  timeout: {:?}", config.timeout);

    let app = router(Arc::new(AppState { prober, config }));

    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
