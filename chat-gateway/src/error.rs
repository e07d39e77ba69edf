//! Typed errors for the chat-gateway crate.

use std::path::PathBuf;

use ai_llm_service::AiLlmError;
use knowledge_loader::KnowledgeError;
use thiserror::Error;

use crate::prompt::GatewayMessages;

/// Per-request failure taxonomy. `Display` carries internal detail for logs;
/// callers only ever see [`ChatError::public_message`].
#[derive(Debug, Error)]
pub enum ChatError {
    /// Remote credential absent; nothing was sent upstream.
    #[error("generation is not configured: missing API key")]
    Configuration,

    /// Required request field missing or blank; nothing was sent upstream.
    #[error("missing required field(s): {0}")]
    Validation(&'static str),

    /// Knowledge corpus did not finish loading in time.
    #[error("knowledge corpus still loading")]
    NotReady,

    /// Remote generation failed: transport, status, decode or timeout.
    #[error("upstream generation failed: {0}")]
    Upstream(#[from] AiLlmError),
}

impl ChatError {
    /// Fixed, non-technical message for HTTP callers.
    pub fn public_message<'a>(&self, messages: &'a GatewayMessages) -> &'a str {
        match self {
            ChatError::Configuration => &messages.missing_api_key,
            ChatError::Validation("question") => &messages.missing_question,
            ChatError::Validation(_) => &messages.missing_question_and_context,
            ChatError::NotReady | ChatError::Upstream(_) => &messages.upstream_failure,
        }
    }
}

/// Startup errors while assembling the gateway.
#[derive(Debug, Error)]
pub enum GatewaySetupError {
    #[error("invalid GROUNDING_MODE '{0}': expected 'request' or 'corpus'")]
    InvalidMode(String),

    #[error("failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: &'static str, value: String },

    #[error("failed to read prompt template {path}: {source}")]
    TemplateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("prompt template is not valid JSON: {0}")]
    TemplateJson(#[from] serde_json::Error),

    #[error("invalid prompt template: {0}")]
    InvalidTemplate(&'static str),

    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
}
