//! Default Gemini config loaded from environment variables.
//!
//! # Environment variables
//!
//! - `GEMINI_API_KEY`   = API key (optional at startup; requests fail with a
//!   configuration error while it is absent)
//! - `GEMINI_API_BASE`  = API base URL (default `https://generativelanguage.googleapis.com`)
//! - `GEMINI_MODEL`     = model id (default `gemini-2.5-flash-lite`)
//! - `LLM_TEMPERATURE`  = sampling temperature (default `0.1`)
//! - `LLM_TOP_K`        = top-k (default `20`)
//! - `LLM_TOP_P`        = top-p (default `0.95`)
//! - `LLM_MAX_TOKENS`   = max output tokens (default `2048`)
//! - `LLM_TIMEOUT_SECS` = request timeout (default `30`)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt, env_opt_f32, env_opt_u32, env_opt_u64,
        validate_http_endpoint, validate_range_f32,
    },
};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";

pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_TOP_K: u32 = 20;
pub const DEFAULT_TOP_P: f32 = 0.95;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Constructs the Gemini config from environment, applying defaults.
///
/// A missing `GEMINI_API_KEY` is **not** an error here: the gateway must start
/// and report the missing credential per request instead.
///
/// # Errors
/// - [`ConfigError::InvalidNumber`] if a sampling/timeout variable does not parse
/// - [`ConfigError::OutOfRange`] / [`ConfigError::InvalidFormat`] from [`validate`]
pub fn config_gemini() -> Result<LlmModelConfig, AiLlmError> {
    let cfg = LlmModelConfig {
        provider: LlmProvider::Gemini,
        model: env_opt("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        endpoint: env_opt("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
        api_key: env_opt("GEMINI_API_KEY"),
        max_tokens: Some(env_opt_u32("LLM_MAX_TOKENS")?.unwrap_or(DEFAULT_MAX_TOKENS)),
        temperature: Some(env_opt_f32("LLM_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE)),
        top_k: Some(env_opt_u32("LLM_TOP_K")?.unwrap_or(DEFAULT_TOP_K)),
        top_p: Some(env_opt_f32("LLM_TOP_P")?.unwrap_or(DEFAULT_TOP_P)),
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS)),
    };

    validate(&cfg)?;
    Ok(cfg)
}

/// Checks model name, endpoint scheme and sampling ranges.
pub fn validate(cfg: &LlmModelConfig) -> Result<(), AiLlmError> {
    if cfg.model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }
    validate_http_endpoint("GEMINI_API_BASE", cfg.endpoint.trim())?;

    if let Some(t) = cfg.temperature {
        validate_range_f32("temperature", t, 0.0, 2.0)?;
    }
    if let Some(p) = cfg.top_p {
        validate_range_f32("top_p", p, 0.0, 1.0)?;
    }
    if cfg.max_tokens == Some(0) {
        return Err(ConfigError::OutOfRange {
            field: "max_tokens",
            detail: "expected at least 1",
        }
        .into());
    }
    if cfg.timeout_secs == Some(0) {
        return Err(ConfigError::OutOfRange {
            field: "timeout_secs",
            detail: "expected at least 1 second",
        }
        .into());
    }
    Ok(())
}
