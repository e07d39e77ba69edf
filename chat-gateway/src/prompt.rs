//! Prompt builder: persona + rules + delimited grounding text + question.
//!
//! Every user-facing string lives in [`PromptTemplate`] and can be replaced
//! from a JSON file without a rebuild. Caller text (question, context,
//! corpus) is appended verbatim and never re-scanned for placeholders.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GatewaySetupError;

/// Placeholder inside rules that expands to [`PromptTemplate::fallback_answer`].
pub const FALLBACK_PLACEHOLDER: &str = "{fallback}";

/// Externalized prompt wording and response messages.
///
/// Any field omitted from an override file keeps its built-in default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplate {
    /// Role/persona preamble that opens the prompt.
    pub persona: String,
    /// Heading shown above the numbered rules.
    pub rules_heading: String,
    /// Behavioral rules, numbered in order. `{fallback}` expands to `fallback_answer`.
    pub rules: Vec<String>,
    /// The exact sentence the model must answer with when nothing is found.
    pub fallback_answer: String,
    /// Line opening the grounding text.
    pub source_open: String,
    /// Line closing the grounding text.
    pub source_close: String,
    /// Sentence introducing the question.
    pub question_intro: String,
    /// Label placed right before the user's question.
    pub question_label: String,
    /// Closing cue marking where the answer begins.
    pub answer_cue: String,
    /// Messages returned to HTTP callers.
    pub messages: GatewayMessages,
}

/// Fixed messages returned to callers, one per outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayMessages {
    /// Remote credential is not configured.
    pub missing_api_key: String,
    /// `question` or `context` missing (per-request context mode).
    pub missing_question_and_context: String,
    /// `question` missing (preloaded corpus mode).
    pub missing_question: String,
    /// Remote generation failed or timed out.
    pub upstream_failure: String,
    /// Remote answered without any candidate text.
    pub empty_answer: String,
}

impl Default for GatewayMessages {
    fn default() -> Self {
        Self {
            missing_api_key: "GEMINI_API_KEY chưa được cấu hình trên server.".into(),
            missing_question_and_context: "Vui lòng cung cấp đủ \"question\" và \"context\".".into(),
            missing_question: "Vui lòng cung cấp \"question\".".into(),
            upstream_failure: "Sư huynh chờ đệ một xíu nhé ! đệ đang hơi quá tải ạ 🙏".into(),
            empty_answer: "Không nhận được câu trả lời hợp lệ từ AI.".into(),
        }
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            persona: "Bạn là một \"Phụng Sự Viên Ảo\" của Pháp Môn Tâm Linh, một người trợ lý tận tâm, nhẹ nhàng, khiêm cung và đầy lòng trắc ẩn. Nhiệm vụ của bạn là tìm câu trả lời cho câu hỏi của người dùng CHỈ từ trong VĂN BẢN NGUỒN được cung cấp.".into(),
            rules_heading: "**QUY TẮC BẮT BUỘC PHẢI TUÂN THEO:**".into(),
            rules: vec![
                "**PHẠM VI TRẢ LỜI:** Chỉ được phép sử dụng thông tin có trong VĂN BẢN NGUỒN. TUYỆT ĐỐI KHÔNG được dùng kiến thức của riêng bạn hoặc thông tin từ bên ngoài.".into(),
                "**TRƯỜNG HỢP KHÔNG TÌM THẤY:** Nếu bạn đọc kỹ VĂN BẢN NGUỒN và không tìm thấy câu trả lời cho câu hỏi, bạn BẮT BUỘC phải trả lời bằng một câu duy nhất, chính xác là: \"{fallback}\" Không giải thích, không xin lỗi, không thêm bất cứ điều gì khác.".into(),
                "**TRÍCH DẪN TRỰC TIẾP:** Cố gắng trích dẫn câu trả lời càng gần với nguyên văn trong tài liệu càng tốt. Không suy diễn, không tóm tắt nếu không cần thiết.".into(),
                "**XỬ LÝ ĐƯỜNG DẪN (LINK):** Nếu câu trả lời có chứa một đường dẫn (URL), hãy đảm bảo bạn trả về đường dẫn đó dưới dạng văn bản thuần túy. TUYỆT ĐỐI KHÔNG bọc đường dẫn trong bất kỳ định dạng nào khác (ví dụ: không dùng Markdown như `[text](link)`).".into(),
                "**Phong cách:** Hãy trả lời một cách tự nhiên, mạch lạc, có chủ ngữ vị ngữ, giọng điệu ấm áp và tôn trọng (xưng \"Đệ\", gọi người dùng là \"Sư huynh\").".into(),
            ],
            fallback_answer: "Mời Sư huynh tra cứu thêm tại mục lục tổng quan : https://mucluc.pmtl.site .".into(),
            source_open: "--- VĂN BẢN NGUỒN ---".into(),
            source_close: "--- KẾT THÚC VĂN BẢN NGUỒN ---".into(),
            question_intro: "Dựa vào các quy tắc và ví dụ trên, hãy trả lời câu hỏi sau:".into(),
            question_label: "Câu hỏi của người dùng:".into(),
            answer_cue: "Câu trả lời của bạn:".into(),
            messages: GatewayMessages::default(),
        }
    }
}

impl PromptTemplate {
    /// Loads overrides from a JSON file and validates the result.
    ///
    /// # Errors
    /// [`GatewaySetupError::TemplateIo`], [`GatewaySetupError::TemplateJson`] or
    /// [`GatewaySetupError::InvalidTemplate`].
    pub fn from_file(path: &Path) -> Result<Self, GatewaySetupError> {
        let raw = std::fs::read_to_string(path).map_err(|source| GatewaySetupError::TemplateIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parses overrides from JSON text and validates the result.
    pub fn from_json(raw: &str) -> Result<Self, GatewaySetupError> {
        let tpl: PromptTemplate = serde_json::from_str(raw)?;
        tpl.validate()?;
        Ok(tpl)
    }

    /// The wrapper must be able to carry the fallback sentence verbatim.
    pub fn validate(&self) -> Result<(), GatewaySetupError> {
        if self.fallback_answer.trim().is_empty() {
            return Err(GatewaySetupError::InvalidTemplate(
                "fallback_answer must not be empty",
            ));
        }
        if !self.rules.iter().any(|r| r.contains(FALLBACK_PLACEHOLDER)) {
            return Err(GatewaySetupError::InvalidTemplate(
                "at least one rule must contain the {fallback} placeholder",
            ));
        }
        if self.source_open.trim().is_empty() || self.source_close.trim().is_empty() {
            return Err(GatewaySetupError::InvalidTemplate(
                "grounding delimiters must not be empty",
            ));
        }
        Ok(())
    }

    /// Builds the full prompt for one request.
    ///
    /// Layout: persona, numbered rules, `grounding` between the delimiters,
    /// question intro, labeled question, answer cue.
    ///
    /// # Example
    /// ```
    /// # use chat_gateway::prompt::PromptTemplate;
    /// let tpl = PromptTemplate::default();
    /// let p = tpl.build_prompt("Mấy giờ mở cửa?", "Mở cửa lúc 8h.");
    /// assert!(p.contains("Mấy giờ mở cửa?"));
    /// assert!(p.contains(&tpl.fallback_answer));
    /// ```
    pub fn build_prompt(&self, question: &str, grounding: &str) -> String {
        let rules_len: usize = self.rules.iter().map(|r| r.len() + 8).sum();
        let mut out = String::with_capacity(
            self.persona.len() + rules_len + grounding.len() + question.len() + 512,
        );

        out.push_str(&self.persona);
        out.push_str("\n\n");
        out.push_str(&self.rules_heading);
        out.push_str("\n\n");

        for (i, rule) in self.rules.iter().enumerate() {
            out.push_str(&format!("{}.  ", i + 1));
            out.push_str(&rule.replace(FALLBACK_PLACEHOLDER, &self.fallback_answer));
            out.push('\n');
        }

        out.push('\n');
        out.push_str(&self.source_open);
        out.push('\n');
        out.push_str(grounding);
        out.push('\n');
        out.push_str(&self.source_close);
        out.push_str("\n\n");

        out.push_str(&self.question_intro);
        out.push_str("\n\n");
        out.push_str(&self.question_label);
        out.push(' ');
        out.push_str(question);
        out.push_str("\n\n");
        out.push_str(&self.answer_cue);

        out
    }
}
