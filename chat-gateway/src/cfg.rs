//! Runtime configuration loaded from environment variables.

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use ai_llm_service::config::default_config::DEFAULT_TIMEOUT_SECS;

use crate::error::GatewaySetupError;

/// Where the grounding text of a request comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroundingMode {
    /// Caller sends `context` with every request.
    #[default]
    RequestContext,
    /// The preloaded knowledge corpus is used; `context` is ignored.
    PreloadedCorpus,
}

impl FromStr for GroundingMode {
    type Err = GatewaySetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "request" | "context" => Ok(GroundingMode::RequestContext),
            "corpus" | "preloaded" => Ok(GroundingMode::PreloadedCorpus),
            other => Err(GatewaySetupError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for GroundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GroundingMode::RequestContext => "request",
            GroundingMode::PreloadedCorpus => "corpus",
        })
    }
}

/// Config bag for the gateway.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub mode: GroundingMode,
    /// Upper bound for the remote call (and for waiting on the corpus).
    pub request_timeout: Duration,
    /// Optional JSON file overriding prompt wording and messages.
    pub template_path: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mode: GroundingMode::default(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            template_path: None,
        }
    }
}

impl GatewayConfig {
    /// Reads `GROUNDING_MODE`, `LLM_TIMEOUT_SECS` and `PROMPT_TEMPLATE_PATH`.
    pub fn from_env() -> Result<Self, GatewaySetupError> {
        let mode = match env_opt("GROUNDING_MODE") {
            Some(v) => v.parse()?,
            None => GroundingMode::default(),
        };

        let request_timeout = match env_opt("LLM_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .ok_or(GatewaySetupError::EnvParse {
                    key: "LLM_TIMEOUT_SECS",
                    value: v,
                })?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            mode,
            request_timeout,
            template_path: env_opt("PROMPT_TEMPLATE_PATH").map(PathBuf::from),
        })
    }
}

fn env_opt(k: &str) -> Option<String> {
    std::env::var(k).ok().filter(|v| !v.trim().is_empty())
}
