//! POST /api/chat: grounded question answering.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chat_gateway::{ChatAnswer, ChatRequest};
use tracing::warn;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

/// Handler: POST /api/chat
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:3001/api/chat \
///   -H 'content-type: application/json' \
///   -d '{"question":"Giờ làm việc là mấy giờ?","context":"Giờ làm việc: 8h-17h."}'
/// ```
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatAnswer>> {
    let gateway = &state.gateway;

    let req = match payload {
        Ok(Json(req)) => req,
        // Missing credential is reported before anything about the body.
        Err(_) if !gateway.is_configured() => ChatRequest::default(),
        Err(rej) => {
            warn!(reason = %rej.body_text(), "chat rejected: unreadable body");
            let err = gateway.validation_error();
            return Err(AppError::from_rejection(
                &rej,
                err.public_message(gateway.messages()),
            ));
        }
    };

    gateway
        .handle_chat(req)
        .await
        .map(Json)
        .map_err(|err| AppError::from_chat(&err, gateway.messages()))
}
