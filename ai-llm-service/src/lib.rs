//! Remote generation provider for the grounded relay.
//!
//! - [`config`]: model/sampling config, loaded from env.
//! - [`services::gemini_service`]: Gemini `generateContent` client.
//! - [`text_generator::TextGenerator`]: the seam the gateway depends on.
//! - [`error_handler`]: unified errors and env helpers.
//! - [`telemetry`]: library-scoped tracing layer.

pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;
pub mod text_generator;

pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use error_handler::{AiLlmError, Result};
pub use services::gemini_service::GeminiService;
pub use text_generator::TextGenerator;
