//! Public request/response types re-used by the HTTP API layer.

use serde::{Deserialize, Serialize};

/// Inbound chat request.
///
/// Both fields are optional at the wire level so that a missing field is a
/// validation error (400) rather than a deserialization failure.
///
/// # Example
/// ```
/// use chat_gateway::ChatRequest;
/// let req: ChatRequest = serde_json::from_str(r#"{"question":"Mấy giờ?"}"#).unwrap();
/// assert_eq!(req.question.as_deref(), Some("Mấy giờ?"));
/// assert!(req.context.is_none());
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
    /// Grounding text supplied by the caller (per-request context mode only).
    #[serde(default)]
    pub context: Option<String>,
}

/// Successful chat outcome.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
}
