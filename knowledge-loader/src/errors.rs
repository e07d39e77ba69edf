//! Unified error type for the knowledge-loader crate.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced while resolving the knowledge corpus.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    // ── Configuration / environment ──────────────────────────────────────────
    /// Failed to parse an environment variable into the expected type.
    #[error("failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: &'static str, value: String },

    /// Fallback URL is set but is not an http(s) URL.
    #[error("invalid fallback url: {0}")]
    InvalidUrl(String),

    // ── I/O & filesystem ────────────────────────────────────────────────────
    /// Local knowledge file exists but could not be read as UTF-8 text.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // ── Remote fallback ─────────────────────────────────────────────────────
    /// Transport error while fetching the fallback URL.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Fallback URL answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: StatusCode, url: String },

    /// No local file and no fallback URL configured.
    #[error("no local knowledge file and no fallback url configured")]
    NoFallback,

    /// All fetch attempts failed; carries the last failure.
    #[error("fallback fetch failed after {attempts} attempt(s): {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<KnowledgeError>,
    },
}

impl KnowledgeError {
    /// Transport failures, 5xx and 429 are worth another attempt; other 4xx are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            KnowledgeError::Http(_) => true,
            KnowledgeError::HttpStatus { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}
