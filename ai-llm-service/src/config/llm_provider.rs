/// Represents the provider (backend) used for remote text generation.
///
/// Only Google Gemini (`generateContent`) is wired today. Adding more providers
/// is done by extending this enum and adding a client under `services`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Google Generative Language API (Gemini models).
    Gemini,
}
