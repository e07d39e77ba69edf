//! Loader configuration from environment variables.

use std::{path::PathBuf, time::Duration};

use crate::errors::KnowledgeError;

pub const DEFAULT_KNOWLEDGE_FILE: &str = "knowledge.txt";
const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_MS: u64 = 500;
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Where the corpus comes from and how hard to try the remote fallback.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Local knowledge file, read verbatim when present.
    pub local_path: PathBuf,
    /// Remote fallback used when the local file is absent or unreadable.
    pub fallback_url: Option<String>,
    /// Total fetch attempts for the fallback (at least 1).
    pub attempts: u32,
    /// Delay before the second attempt; doubles each retry.
    pub initial_backoff: Duration,
    /// Upper bound for the retry delay.
    pub max_backoff: Duration,
    /// Per-attempt HTTP timeout.
    pub fetch_timeout: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            local_path: PathBuf::from(DEFAULT_KNOWLEDGE_FILE),
            fallback_url: None,
            attempts: DEFAULT_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            max_backoff: MAX_BACKOFF,
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl LoaderConfig {
    /// Reads:
    /// - `KNOWLEDGE_FILE_PATH` (default `knowledge.txt`)
    /// - `KNOWLEDGE_FALLBACK_URL` (optional, http/https)
    /// - `KNOWLEDGE_FETCH_ATTEMPTS` (default 3, min 1)
    /// - `KNOWLEDGE_FETCH_BACKOFF_MS` (default 500)
    /// - `KNOWLEDGE_FETCH_TIMEOUT_SECS` (default 20)
    ///
    /// # Errors
    /// [`KnowledgeError::EnvParse`] for unparsable numbers,
    /// [`KnowledgeError::InvalidUrl`] for a non-http fallback.
    pub fn from_env() -> Result<Self, KnowledgeError> {
        let dflt = Self::default();

        let fallback_url = env_opt("KNOWLEDGE_FALLBACK_URL");
        if let Some(url) = &fallback_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(KnowledgeError::InvalidUrl(url.clone()));
            }
        }

        Ok(Self {
            local_path: env_opt("KNOWLEDGE_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or(dflt.local_path),
            fallback_url,
            attempts: parse("KNOWLEDGE_FETCH_ATTEMPTS", dflt.attempts)?.max(1),
            initial_backoff: Duration::from_millis(parse(
                "KNOWLEDGE_FETCH_BACKOFF_MS",
                DEFAULT_BACKOFF_MS,
            )?),
            max_backoff: dflt.max_backoff,
            fetch_timeout: Duration::from_secs(parse(
                "KNOWLEDGE_FETCH_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
        })
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse<T: std::str::FromStr>(key: &'static str, dflt: T) -> Result<T, KnowledgeError> {
    match env_opt(key) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| KnowledgeError::EnvParse { key, value: v }),
        None => Ok(dflt),
    }
}
