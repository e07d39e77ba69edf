use std::sync::Arc;

use axum::http::HeaderValue;
use chat_gateway::ChatGateway;
use tracing::warn;

use crate::error_handler::AppError;

const DEFAULT_PORT: &str = "3001";
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Question answering over the configured grounding source.
    pub gateway: Arc<ChatGateway>,
}

impl AppState {
    pub fn new(gateway: ChatGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen address, e.g. `0.0.0.0:3001`.
    pub address: String,
    /// Upper bound for JSON request bodies.
    pub max_body_bytes: usize,
    /// Allowed CORS origins; `None` allows any origin.
    pub cors_origins: Option<Vec<HeaderValue>>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: format!("0.0.0.0:{DEFAULT_PORT}"),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            cors_origins: None,
        }
    }
}

impl ApiConfig {
    /// Load server settings from environment variables.
    ///
    /// - `API_ADDRESS`, else `0.0.0.0:${PORT:-3001}`
    /// - `MAX_BODY_BYTES` (default 10 MiB)
    /// - `CORS_ALLOWED_ORIGINS` (comma-separated)
    pub fn from_env() -> Result<Self, AppError> {
        let address = env_opt("API_ADDRESS").unwrap_or_else(|| {
            let port = env_opt("PORT").unwrap_or_else(|| DEFAULT_PORT.into());
            format!("0.0.0.0:{port}")
        });

        let max_body_bytes = match env_opt("MAX_BODY_BYTES") {
            Some(v) => v.trim().parse::<usize>().map_err(|_| AppError::Config {
                key: "MAX_BODY_BYTES",
                value: v,
            })?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let cors_origins = match env_opt("CORS_ALLOWED_ORIGINS") {
            Some(raw) => Some(parse_origins(&raw)?),
            None => {
                warn!("CORS_ALLOWED_ORIGINS is not set; allowing requests from any origin");
                None
            }
        };

        Ok(Self {
            address,
            max_body_bytes,
            cors_origins,
        })
    }
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            HeaderValue::from_str(s).map_err(|_| AppError::Config {
                key: "CORS_ALLOWED_ORIGINS",
                value: s.to_string(),
            })
        })
        .collect()
}

fn env_opt(k: &str) -> Option<String> {
    std::env::var(k).ok().filter(|v| !v.trim().is_empty())
}
