//! GET /api/ready: readiness of the grounding source.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chat_gateway::GroundingMode;
use knowledge_loader::KnowledgeStatus;
use serde_json::json;

use crate::core::app_state::AppState;

/// Handler: GET /api/ready
///
/// In request-context mode there is nothing to load, so the service is
/// always ready. In corpus mode the knowledge status is reported as is,
/// with `503` while the load is still running.
pub async fn ready(State(state): State<Arc<AppState>>) -> Response {
    if state.gateway.mode() == GroundingMode::RequestContext {
        return Json(json!({ "status": "ready" })).into_response();
    }

    let status = state.gateway.knowledge().status();
    let code = match status {
        KnowledgeStatus::Loading => StatusCode::SERVICE_UNAVAILABLE,
        KnowledgeStatus::Ready { .. } | KnowledgeStatus::Degraded { .. } => StatusCode::OK,
    };
    (code, Json(status)).into_response()
}
