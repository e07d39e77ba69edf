//! Remote generator construction.

use std::sync::Arc;

use ai_llm_service::{GeminiService, LlmModelConfig, TextGenerator};
use tracing::warn;

use crate::error::GatewaySetupError;

/// Builds the Gemini client when a key is configured.
///
/// `Ok(None)` means "not configured": the gateway still starts and answers
/// every chat with the configuration error.
pub fn build_generator(
    cfg: LlmModelConfig,
) -> Result<Option<Arc<dyn TextGenerator>>, GatewaySetupError> {
    if !cfg.has_api_key() {
        warn!(model = %cfg.model, "GEMINI_API_KEY is not set; /api/chat will answer with a configuration error");
        return Ok(None);
    }
    let svc = GeminiService::new(cfg)?;
    Ok(Some(Arc::new(svc)))
}
