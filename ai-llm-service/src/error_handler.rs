//! Errors for the generation provider.
//!
//! [`AiLlmError`] is the only error the crate returns. Startup problems land in
//! [`ConfigError`], per-call failures in [`ProviderError`]. The env and range
//! helpers at the bottom are what [`crate::config::default_config`] builds on.

use std::fmt;
use std::time::Duration;

pub use reqwest::StatusCode;
use thiserror::Error;

use crate::config::llm_provider::LlmProvider;

pub type Result<T> = std::result::Result<T, AiLlmError>;

/// Everything that can go wrong between reading `GEMINI_*` variables and
/// getting text back from the model.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The provider answered, but not with something usable.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Connect/read failure or client-side timeout inside `reqwest`.
    #[error("llm transport: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// The caller-side deadline elapsed before the provider answered.
    #[error("llm call exceeded {0:?}")]
    Timeout(Duration),
}

/// Bad sampling or endpoint settings. Only raised at startup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("llm config: {var} is not a valid number ({reason})")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    #[error("llm config: {var} {reason}")]
    InvalidFormat {
        var: &'static str,
        reason: &'static str,
    },

    #[error("llm config: {field} out of range, {detail}")]
    OutOfRange {
        field: &'static str,
        detail: &'static str,
    },

    #[error("llm config: GEMINI_MODEL is empty")]
    EmptyModel,
}

/// Non-2xx answer from the generation endpoint, as seen in logs.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: StatusCode,
    /// Endpoint URL. The key travels in a header, so this is safe to print.
    pub url: String,
    /// Flattened, length-capped response body.
    pub snippet: String,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.status, self.url, self.snippet)
    }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderErrorKind {
    #[error("config is for a different provider")]
    InvalidProvider,

    #[error("no API key configured")]
    MissingApiKey,

    #[error("endpoint '{0}' is not an http(s) URL")]
    InvalidEndpoint(String),

    #[error("{0}")]
    HttpStatus(HttpError),

    /// Body was not a `generateContent` response.
    #[error("undecodable response: {0}")]
    Decode(String),
}

/// A failure attributed to one provider backend.
#[derive(Debug, Error)]
#[error("{provider:?} provider: {kind}")]
pub struct ProviderError {
    pub provider: LlmProvider,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: LlmProvider, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }
}

/// Collapses whitespace and cuts the body to 240 chars, for one-line logs.
pub fn make_snippet(text: &str) -> String {
    const MAX_CHARS: usize = 240;
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX_CHARS {
        return flat;
    }
    let mut out: String = flat.chars().take(MAX_CHARS).collect();
    out.push('…');
    out
}

/// Reads `name`, treating unset and blank the same.
pub fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn env_opt_u32(name: &'static str) -> Result<Option<u32>> {
    env_opt_parse(name, "expected u32")
}

pub fn env_opt_u64(name: &'static str) -> Result<Option<u64>> {
    env_opt_parse(name, "expected u64")
}

pub fn env_opt_f32(name: &'static str) -> Result<Option<f32>> {
    env_opt_parse(name, "expected a decimal number")
}

fn env_opt_parse<T: std::str::FromStr>(name: &'static str, reason: &'static str) -> Result<Option<T>> {
    let Some(raw) = env_opt(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber { var: name, reason }.into())
}

/// `value` must carry an `http://` or `https://` scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    match value.split_once("://") {
        Some(("http" | "https", rest)) if !rest.is_empty() => Ok(()),
        _ => Err(ConfigError::InvalidFormat {
            var,
            reason: "must be an http:// or https:// URL",
        }
        .into()),
    }
}

/// Inclusive range check that also rejects NaN and infinities.
pub fn validate_range_f32(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        return Ok(());
    }
    Err(ConfigError::OutOfRange {
        field,
        detail: "value outside the accepted interval",
    }
    .into())
}
