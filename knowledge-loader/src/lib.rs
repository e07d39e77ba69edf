//! Knowledge corpus loading for the grounded relay.
//!
//! Public API: [`KnowledgeLoader::load`] resolves the corpus once (local file,
//! then remote fallback with retries) and publishes it into a shared
//! [`KnowledgeBase`]. Handlers read the corpus through the handle and can wait
//! on its readiness barrier.

pub mod config;
pub mod errors;
pub mod knowledge_base;
mod loader;

pub use config::LoaderConfig;
pub use errors::KnowledgeError;
pub use knowledge_base::{CorpusSource, KnowledgeBase, KnowledgeSnapshot, KnowledgeStatus};
pub use loader::{KnowledgeLoader, LoadedCorpus};
