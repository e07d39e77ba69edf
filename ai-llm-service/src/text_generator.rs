//! Provider-agnostic generation seam.
//!
//! The gateway only depends on this trait, so tests can swap the remote
//! client for an in-process stub.

use async_trait::async_trait;

use crate::error_handler::Result;

/// A single-shot, non-streaming text generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends `prompt` once and returns the first candidate's text.
    ///
    /// `Ok(None)` means the upstream answered successfully but the response
    /// carried no usable text (no candidates, no parts, or an empty part).
    ///
    /// # Errors
    /// Transport failures, non-2xx statuses and undecodable bodies.
    async fn generate(&self, prompt: &str) -> Result<Option<String>>;

    /// Model identifier, used for logging.
    fn model(&self) -> &str;
}
