//! The request handler: validate, ground, generate once, extract.

use std::{sync::Arc, time::Instant};

use ai_llm_service::{AiLlmError, TextGenerator};
use knowledge_loader::{KnowledgeBase, KnowledgeStatus};
use tracing::{error, info, instrument, warn};

use crate::{
    api_types::{ChatAnswer, ChatRequest},
    cfg::{GatewayConfig, GroundingMode},
    error::ChatError,
    prompt::{GatewayMessages, PromptTemplate},
};

/// Shared, immutable gateway. Construct once, wrap in `Arc`, hand to handlers.
pub struct ChatGateway {
    cfg: GatewayConfig,
    template: PromptTemplate,
    generator: Option<Arc<dyn TextGenerator>>,
    knowledge: KnowledgeBase,
}

impl ChatGateway {
    /// `generator = None` models a missing API key.
    pub fn new(
        cfg: GatewayConfig,
        template: PromptTemplate,
        generator: Option<Arc<dyn TextGenerator>>,
        knowledge: KnowledgeBase,
    ) -> Self {
        Self {
            cfg,
            template,
            generator,
            knowledge,
        }
    }

    pub fn mode(&self) -> GroundingMode {
        self.cfg.mode
    }

    pub fn messages(&self) -> &GatewayMessages {
        &self.template.messages
    }

    /// `false` when no API key was configured.
    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Answers one question.
    ///
    /// Order of checks: credential, then fields, then (corpus mode) the
    /// readiness barrier. Only after all three pass is the remote API called,
    /// exactly once and bounded by `request_timeout`. A response without text
    /// is answered with the `empty_answer` placeholder.
    ///
    /// # Errors
    /// [`ChatError::Configuration`], [`ChatError::Validation`],
    /// [`ChatError::NotReady`] or [`ChatError::Upstream`].
    #[instrument(skip_all, fields(mode = %self.cfg.mode))]
    pub async fn handle_chat(&self, req: ChatRequest) -> Result<ChatAnswer, ChatError> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            error!("chat rejected: GEMINI_API_KEY is not configured");
            ChatError::Configuration
        })?;

        let question = non_blank(req.question).ok_or_else(|| {
            warn!("chat rejected: missing question");
            self.validation_error()
        })?;

        let prompt = match self.cfg.mode {
            GroundingMode::RequestContext => {
                let context = non_blank(req.context).ok_or_else(|| {
                    warn!("chat rejected: missing context");
                    self.validation_error()
                })?;
                self.template.build_prompt(&question, &context)
            }
            GroundingMode::PreloadedCorpus => {
                let snap = tokio::time::timeout(self.cfg.request_timeout, self.knowledge.wait_ready())
                    .await
                    .map_err(|_| {
                        error!("chat failed: knowledge corpus still loading");
                        ChatError::NotReady
                    })?;
                if let KnowledgeStatus::Degraded { reason } = &snap.status {
                    warn!(%reason, "grounding against an empty knowledge corpus");
                }
                self.template.build_prompt(&question, &snap.corpus)
            }
        };

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.cfg.request_timeout, generator.generate(&prompt))
            .await
            .unwrap_or(Err(AiLlmError::Timeout(self.cfg.request_timeout)));

        match outcome {
            Ok(text) => {
                let answer = text.unwrap_or_else(|| {
                    warn!(model = generator.model(), "model returned no candidate text");
                    self.template.messages.empty_answer.clone()
                });
                info!(
                    model = generator.model(),
                    prompt_len = prompt.len(),
                    answer_len = answer.len(),
                    latency_ms = started.elapsed().as_millis(),
                    "chat answered"
                );
                Ok(ChatAnswer { answer })
            }
            Err(err) => {
                error!(
                    model = generator.model(),
                    error = %err,
                    latency_ms = started.elapsed().as_millis(),
                    "chat failed: remote generation error"
                );
                Err(ChatError::Upstream(err))
            }
        }
    }

    /// The validation error for this mode, also used for unparsable bodies.
    pub fn validation_error(&self) -> ChatError {
        match self.cfg.mode {
            GroundingMode::RequestContext => ChatError::Validation("question, context"),
            GroundingMode::PreloadedCorpus => ChatError::Validation("question"),
        }
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use ai_llm_service::error_handler::{HttpError, ProviderError, ProviderErrorKind, StatusCode};
    use ai_llm_service::LlmProvider;
    use async_trait::async_trait;
    use knowledge_loader::CorpusSource;

    enum Reply {
        Text(&'static str),
        Empty,
        Fail,
        Hang,
    }

    struct StubGenerator {
        reply: Reply,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl StubGenerator {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, prompt: &str) -> ai_llm_service::Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match self.reply {
                Reply::Text(t) => Ok(Some(t.to_string())),
                Reply::Empty => Ok(None),
                Reply::Fail => Err(ProviderError::new(
                    LlmProvider::Gemini,
                    ProviderErrorKind::HttpStatus(HttpError {
                        status: StatusCode::INTERNAL_SERVER_ERROR,
                        url: "https://upstream.test/generate".into(),
                        snippet: "internal stack trace".into(),
                    }),
                )
                .into()),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(None)
                }
            }
        }

        fn model(&self) -> &str {
            "stub"
        }
    }

    fn gateway(
        mode: GroundingMode,
        stub: Option<Arc<StubGenerator>>,
        knowledge: KnowledgeBase,
    ) -> ChatGateway {
        let cfg = GatewayConfig {
            mode,
            request_timeout: Duration::from_millis(200),
            template_path: None,
        };
        let generator = stub.map(|s| s as Arc<dyn TextGenerator>);
        ChatGateway::new(cfg, PromptTemplate::default(), generator, knowledge)
    }

    fn req(question: Option<&str>, context: Option<&str>) -> ChatRequest {
        ChatRequest {
            question: question.map(str::to_string),
            context: context.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn answers_with_request_context() {
        let stub = StubGenerator::new(Reply::Text("Giờ làm việc là 8h đến 17h."));
        let gw = gateway(GroundingMode::RequestContext, Some(stub.clone()), KnowledgeBase::new());

        let out = gw
            .handle_chat(req(Some("Giờ làm việc là mấy giờ?"), Some("Giờ làm việc: 8h-17h.")))
            .await
            .unwrap();

        assert_eq!(out.answer, "Giờ làm việc là 8h đến 17h.");
        assert_eq!(stub.calls(), 1);
        let prompt = stub.last_prompt.lock().unwrap().clone().unwrap();
        assert_eq!(prompt.matches("Giờ làm việc là mấy giờ?").count(), 1);
        assert_eq!(prompt.matches("Giờ làm việc: 8h-17h.").count(), 1);
    }

    #[tokio::test]
    async fn missing_fields_never_reach_upstream() {
        let stub = StubGenerator::new(Reply::Text("unused"));
        let gw = gateway(GroundingMode::RequestContext, Some(stub.clone()), KnowledgeBase::new());

        for r in [
            req(None, None),
            req(Some("q"), None),
            req(None, Some("ctx")),
            req(Some("   "), Some("ctx")),
            req(Some("q"), Some("")),
        ] {
            let err = gw.handle_chat(r).await.unwrap_err();
            assert!(matches!(err, ChatError::Validation(_)));
            assert_eq!(
                err.public_message(gw.messages()),
                gw.messages().missing_question_and_context
            );
        }
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn missing_key_wins_over_validation() {
        let gw = gateway(GroundingMode::RequestContext, None, KnowledgeBase::new());
        for r in [req(None, None), req(Some("q"), Some("c"))] {
            let err = gw.handle_chat(r).await.unwrap_err();
            assert!(matches!(err, ChatError::Configuration));
            assert_eq!(err.public_message(gw.messages()), gw.messages().missing_api_key);
        }
    }

    #[tokio::test]
    async fn upstream_failure_maps_to_apology_without_detail() {
        let stub = StubGenerator::new(Reply::Fail);
        let gw = gateway(GroundingMode::RequestContext, Some(stub.clone()), KnowledgeBase::new());

        let err = gw.handle_chat(req(Some("q"), Some("c"))).await.unwrap_err();
        assert!(matches!(err, ChatError::Upstream(_)));
        let public = err.public_message(gw.messages());
        assert_eq!(public, gw.messages().upstream_failure);
        assert!(!public.contains("stack trace"));
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn empty_candidate_uses_placeholder() {
        let stub = StubGenerator::new(Reply::Empty);
        let gw = gateway(GroundingMode::RequestContext, Some(stub), KnowledgeBase::new());

        let out = gw.handle_chat(req(Some("q"), Some("c"))).await.unwrap();
        assert_eq!(out.answer, gw.messages().empty_answer);
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let stub = StubGenerator::new(Reply::Hang);
        let gw = gateway(GroundingMode::RequestContext, Some(stub.clone()), KnowledgeBase::new());

        let err = gw.handle_chat(req(Some("q"), Some("c"))).await.unwrap_err();
        assert!(matches!(err, ChatError::Upstream(AiLlmError::Timeout(_))));
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn corpus_mode_grounds_on_preloaded_text_and_ignores_context() {
        let stub = StubGenerator::new(Reply::Text("ok"));
        let kb = KnowledgeBase::preloaded("CORPUS-TEXT");
        let gw = gateway(GroundingMode::PreloadedCorpus, Some(stub.clone()), kb);

        gw.handle_chat(req(Some("question?"), Some("CALLER-CONTEXT")))
            .await
            .unwrap();

        let prompt = stub.last_prompt.lock().unwrap().clone().unwrap();
        assert_eq!(prompt.matches("CORPUS-TEXT").count(), 1);
        assert!(!prompt.contains("CALLER-CONTEXT"));
    }

    #[tokio::test]
    async fn corpus_mode_only_requires_question() {
        let stub = StubGenerator::new(Reply::Text("ok"));
        let gw = gateway(
            GroundingMode::PreloadedCorpus,
            Some(stub.clone()),
            KnowledgeBase::preloaded("corpus"),
        );

        let err = gw.handle_chat(req(None, Some("c"))).await.unwrap_err();
        assert_eq!(err.public_message(gw.messages()), gw.messages().missing_question);
        assert!(gw.handle_chat(req(Some("q"), None)).await.is_ok());
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn corpus_mode_waits_for_loader() {
        let stub = StubGenerator::new(Reply::Text("ok"));
        let kb = KnowledgeBase::new();
        let gw = Arc::new(gateway(GroundingMode::PreloadedCorpus, Some(stub.clone()), kb.clone()));

        let pending = {
            let gw = gw.clone();
            tokio::spawn(async move { gw.handle_chat(req(Some("q"), None)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(stub.calls(), 0);

        kb.publish_text("late corpus".into(), CorpusSource::Inline);
        assert!(pending.await.unwrap().is_ok());
        let prompt = stub.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("late corpus"));
    }

    #[tokio::test]
    async fn corpus_mode_degraded_still_calls_model() {
        let stub = StubGenerator::new(Reply::Text("ok"));
        let kb = KnowledgeBase::new();
        kb.publish_failure("no local knowledge file and no fallback url configured");
        let gw = gateway(GroundingMode::PreloadedCorpus, Some(stub.clone()), kb);

        let out = gw.handle_chat(req(Some("q"), None)).await.unwrap();
        assert_eq!(out.answer, "ok");
        assert_eq!(stub.calls(), 1);

        let tpl = PromptTemplate::default();
        let prompt = stub.last_prompt.lock().unwrap().clone().unwrap();
        let open = prompt.find(&tpl.source_open).unwrap() + tpl.source_open.len();
        let close = prompt.find(&tpl.source_close).unwrap();
        assert_eq!(prompt[open..close].trim(), "");
    }

    #[tokio::test]
    async fn corpus_mode_not_ready_after_timeout() {
        let stub = StubGenerator::new(Reply::Text("ok"));
        let gw = gateway(GroundingMode::PreloadedCorpus, Some(stub.clone()), KnowledgeBase::new());

        let err = gw.handle_chat(req(Some("q"), None)).await.unwrap_err();
        assert!(matches!(err, ChatError::NotReady));
        assert_eq!(stub.calls(), 0);
    }
}
