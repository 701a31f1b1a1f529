use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use chamados_core::{
    ticket::{display_meta, next_status, StatusMeta},
    SanitizedConfig, TicketStatus,
};

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state).await;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}

/// One row of the status table.
#[derive(Debug, Serialize)]
pub struct StatusInfo {
    pub status: TicketStatus,
    pub next_status: Option<TicketStatus>,
    #[serde(flatten)]
    pub meta: StatusMeta,
}

/// Lifecycle table, in workflow order, for clients rendering badges and
/// advance buttons.
pub async fn list_statuses() -> Json<Vec<StatusInfo>> {
    Json(
        TicketStatus::ALL
            .into_iter()
            .map(|status| StatusInfo {
                status,
                next_status: next_status(status),
                meta: display_meta(status),
            })
            .collect(),
    )
}
