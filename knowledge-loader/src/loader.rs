//! One-shot corpus loader: local file first, remote fallback with retries.

use std::path::Path;

use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::LoaderConfig,
    errors::KnowledgeError,
    knowledge_base::{CorpusSource, KnowledgeBase, KnowledgeStatus},
};

/// Text read from a concrete source, byte-for-byte.
#[derive(Debug, Clone)]
pub struct LoadedCorpus {
    pub text: String,
    pub source: CorpusSource,
}

/// Resolves the knowledge corpus according to [`LoaderConfig`].
pub struct KnowledgeLoader {
    cfg: LoaderConfig,
    client: reqwest::Client,
}

impl KnowledgeLoader {
    /// # Errors
    /// [`KnowledgeError::Http`] if the HTTP client cannot be built.
    pub fn new(cfg: LoaderConfig) -> Result<Self, KnowledgeError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.fetch_timeout)
            .gzip(true)
            .build()?;
        Ok(Self { cfg, client })
    }

    /// Loads the corpus and publishes it into `kb`.
    ///
    /// Never fails: an unusable result is published as `Degraded` and logged,
    /// so the service keeps running with an empty corpus.
    pub async fn load(&self, kb: &KnowledgeBase) -> KnowledgeStatus {
        match self.read_corpus().await {
            Ok(LoadedCorpus { text, source }) => {
                kb.publish_text(text, source);
                let status = kb.status();
                match &status {
                    KnowledgeStatus::Ready { source, chars } => {
                        info!(?source, chars, "knowledge corpus loaded");
                    }
                    other => {
                        warn!(status = ?other, "knowledge corpus loaded but unusable");
                    }
                }
                status
            }
            Err(err) => {
                error!(
                    error = %err,
                    local_path = %self.cfg.local_path.display(),
                    fallback_url = self.cfg.fallback_url.as_deref().unwrap_or("-"),
                    "knowledge corpus unavailable; serving with empty corpus"
                );
                kb.publish_failure(err.to_string());
                kb.status()
            }
        }
    }

    /// Reads the local file if it exists and is readable, otherwise fetches
    /// the fallback URL.
    ///
    /// # Errors
    /// [`KnowledgeError::NoFallback`] when the local file is unusable and no
    /// URL is configured; [`KnowledgeError::Exhausted`] when every fetch failed.
    pub async fn read_corpus(&self) -> Result<LoadedCorpus, KnowledgeError> {
        let path = self.cfg.local_path.as_path();

        match read_local(path).await {
            Ok(Some(text)) => {
                return Ok(LoadedCorpus {
                    text,
                    source: CorpusSource::Local {
                        path: path.to_path_buf(),
                    },
                });
            }
            Ok(None) => {
                info!(path = %path.display(), "local knowledge file not found; trying fallback");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "local knowledge file unreadable; trying fallback");
            }
        }

        let url = self
            .cfg
            .fallback_url
            .as_deref()
            .ok_or(KnowledgeError::NoFallback)?;

        let text = self.fetch_with_retry(url).await?;
        Ok(LoadedCorpus {
            text,
            source: CorpusSource::Remote {
                url: url.to_string(),
            },
        })
    }

    #[instrument(skip(self), fields(attempts = self.cfg.attempts))]
    async fn fetch_with_retry(&self, url: &str) -> Result<String, KnowledgeError> {
        let attempts = self.cfg.attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.fetch_once(url).await {
                Ok(text) => {
                    debug!(attempt, bytes = text.len(), "fallback fetch succeeded");
                    return Ok(text);
                }
                Err(err) if attempt < attempts && err.is_retryable() => {
                    let delay = self.cfg.backoff_for(attempt);
                    warn!(
                        attempt,
                        error = %err,
                        retry_in_ms = delay.as_millis(),
                        "fallback fetch failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    return Err(KnowledgeError::Exhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, KnowledgeError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(KnowledgeError::HttpStatus {
                status,
                url: url.to_string(),
            });
        }
        Ok(resp.text().await?)
    }
}

/// `Ok(None)` when the file does not exist.
async fn read_local(path: &Path) -> Result<Option<String>, KnowledgeError> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(None);
    }
    Ok(Some(tokio::fs::read_to_string(path).await?))
}
