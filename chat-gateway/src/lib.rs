//! Grounded question answering over a single remote generation call.
//!
//! Public API: [`ChatGateway::handle_chat`]. It checks the credential and the
//! request fields, picks the grounding text (caller `context` or the preloaded
//! corpus, depending on [`GroundingMode`]), wraps it in the instruction
//! template, calls the model once and returns the first candidate text.
//!
//! Everything the caller or the model reads (persona, rules, fallback
//! sentence, error messages) comes from [`PromptTemplate`], which can be
//! overridden from a JSON file.

mod api_types;
pub mod cfg;
mod error;
mod gateway;
mod llm;
pub mod prompt;

pub use api_types::{ChatAnswer, ChatRequest};
pub use cfg::{GatewayConfig, GroundingMode};
pub use error::{ChatError, GatewaySetupError};
pub use gateway::ChatGateway;
pub use llm::build_generator;
pub use prompt::{GatewayMessages, PromptTemplate};

use knowledge_loader::{KnowledgeLoader, LoaderConfig};

/// Loads the template from `cfg.template_path`, or the built-in one.
///
/// # Errors
/// Propagates template read/parse/validation failures.
pub fn load_template(cfg: &GatewayConfig) -> Result<PromptTemplate, GatewaySetupError> {
    match &cfg.template_path {
        Some(path) => PromptTemplate::from_file(path),
        None => Ok(PromptTemplate::default()),
    }
}

/// Builds the corpus loader from the `KNOWLEDGE_*` variables.
///
/// # Errors
/// [`GatewaySetupError::Knowledge`] for unparsable values, a non-http
/// fallback URL or an HTTP client that cannot be built.
pub fn loader_from_env() -> Result<KnowledgeLoader, GatewaySetupError> {
    let cfg = LoaderConfig::from_env()?;
    Ok(KnowledgeLoader::new(cfg)?)
}
