use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chat_gateway::{ChatError, GatewayMessages};
use serde::Serialize;
use thiserror::Error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("invalid env variable: {key} = '{value}'")]
    Config { key: &'static str, value: String },

    // --- IO / network / server ---
    #[error("failed to bind listener on {address}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    /// Request outcome with a caller-safe message.
    #[error("{message}")]
    Http { status: StatusCode, message: String },
}

impl AppError {
    /// Maps a gateway failure to its status and fixed public message.
    pub fn from_chat(err: &ChatError, messages: &GatewayMessages) -> Self {
        let status = match err {
            ChatError::Validation(_) => StatusCode::BAD_REQUEST,
            ChatError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ChatError::Configuration | ChatError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::Http {
            status,
            message: err.public_message(messages).to_string(),
        }
    }

    /// An unparsable body is answered like a missing field; an oversized
    /// body keeps its 413.
    pub fn from_rejection(rej: &JsonRejection, validation_message: &str) -> Self {
        let status = match rej.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        AppError::Http {
            status,
            message: validation_message.to_string(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Http { status, .. } => *status,
            // startup-only
            AppError::Config { .. } | AppError::Bind { .. } | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;
