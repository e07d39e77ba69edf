//! HTTP surface: `/api/health`, `/api/ready` and `/api/chat`.

use std::sync::Arc;

pub mod core;
pub mod error_handler;
mod routes;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
    routing::{get, post},
};
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

pub use crate::core::app_state::{ApiConfig, AppState};
pub use crate::error_handler::AppError;

use crate::routes::{chat::chat_route::chat, health_route::health, ready_route::ready};

/// Builds the router with all routes and layers attached.
pub fn build_router(state: AppState, cfg: &ApiConfig) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/ready", get(ready))
        .route("/api/chat", post(chat))
        .layer(DefaultBodyLimit::max(cfg.max_body_bytes))
        .layer(cors_layer(cfg.cors_origins.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn cors_layer(origins: Option<Vec<axum::http::HeaderValue>>) -> CorsLayer {
    match origins {
        Some(list) => CorsLayer::new()
            .allow_origin(AllowOrigin::list(list))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]),
        None => CorsLayer::permissive(),
    }
}

/// Binds `cfg.address` and serves until Ctrl+C.
pub async fn start(state: AppState, cfg: ApiConfig) -> Result<(), AppError> {
    let app = build_router(state, &cfg);

    let listener = tokio::net::TcpListener::bind(&cfg.address)
        .await
        .map_err(|source| AppError::Bind {
            address: cfg.address.clone(),
            source,
        })?;
    info!(address = %cfg.address, "HTTP server listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("HTTP server stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        // Without a signal handler, keep serving until the process is killed.
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ai_llm_service::TextGenerator;
    use ai_llm_service::error_handler::{
        AiLlmError, HttpError, ProviderError, ProviderErrorKind, StatusCode as UpstreamStatus,
    };
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use chat_gateway::{ChatGateway, GatewayConfig, GatewayMessages, GroundingMode, PromptTemplate};
    use knowledge_loader::{CorpusSource, KnowledgeBase};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const QUESTION: &str = "Giờ làm việc là mấy giờ?";
    const CONTEXT: &str = "Giờ làm việc: 8h-17h.";
    const ANSWER: &str = "Giờ làm việc là 8h đến 17h.";

    struct StubGenerator {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, _prompt: &str) -> ai_llm_service::Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AiLlmError::from(ProviderError::new(
                    ai_llm_service::LlmProvider::Gemini,
                    ProviderErrorKind::HttpStatus(HttpError {
                        status: UpstreamStatus::SERVICE_UNAVAILABLE,
                        url: "https://upstream.test".into(),
                        snippet: "quota exceeded for project 1234".into(),
                    }),
                )));
            }
            Ok(Some(ANSWER.to_string()))
        }

        fn model(&self) -> &str {
            "stub"
        }
    }

    struct Harness {
        router: Router,
        stub: Option<Arc<StubGenerator>>,
    }

    impl Harness {
        fn new(mode: GroundingMode, stub: Option<StubGenerator>, kb: KnowledgeBase) -> Self {
            let stub = stub.map(Arc::new);
            let generator = stub.clone().map(|s| s as Arc<dyn TextGenerator>);
            let gateway = ChatGateway::new(
                GatewayConfig {
                    mode,
                    ..GatewayConfig::default()
                },
                PromptTemplate::default(),
                generator,
                kb,
            );
            let router = build_router(AppState::new(gateway), &ApiConfig::default());
            Self { router, stub }
        }

        fn request_mode(fail: bool) -> Self {
            Self::new(
                GroundingMode::RequestContext,
                Some(StubGenerator {
                    fail,
                    calls: AtomicUsize::new(0),
                }),
                KnowledgeBase::new(),
            )
        }

        fn calls(&self) -> usize {
            self.stub
                .as_ref()
                .map(|s| s.calls.load(Ordering::SeqCst))
                .unwrap_or(0)
        }

        async fn send(&self, req: Request<Body>) -> Response {
            self.router.clone().oneshot(req).await.unwrap()
        }
    }

    fn post_chat(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(res: Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn chat_returns_model_answer() {
        let h = Harness::request_mode(false);
        let body = json!({ "question": QUESTION, "context": CONTEXT }).to_string();

        let res = h.send(post_chat(body)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, json!({ "answer": ANSWER }));
        assert_eq!(h.calls(), 1);
    }

    #[tokio::test]
    async fn empty_body_is_a_validation_error() {
        let h = Harness::request_mode(false);

        let res = h.send(post_chat("{}")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(res).await,
            json!({ "error": GatewayMessages::default().missing_question_and_context })
        );
        assert_eq!(h.calls(), 0);
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let h = Harness::request_mode(false);

        let res = h.send(post_chat("{not json")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(res).await["error"],
            GatewayMessages::default().missing_question_and_context
        );
        assert_eq!(h.calls(), 0);
    }

    #[tokio::test]
    async fn wrong_content_type_is_a_validation_error() {
        let h = Harness::request_mode(false);
        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "text/plain")
            .body(Body::from(
                json!({ "question": QUESTION, "context": CONTEXT }).to_string(),
            ))
            .unwrap();

        let res = h.send(req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(res).await,
            json!({ "error": GatewayMessages::default().missing_question_and_context })
        );
        assert_eq!(h.calls(), 0);
    }

    #[tokio::test]
    async fn missing_key_wins_over_any_body() {
        let h = Harness::new(GroundingMode::RequestContext, None, KnowledgeBase::new());
        let expected = json!({ "error": GatewayMessages::default().missing_api_key });

        for body in ["{}", "{not json", r#"{"question":"q","context":"c"}"#] {
            let res = h.send(post_chat(body)).await;
            assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(json_body(res).await, expected);
        }
    }

    #[tokio::test]
    async fn upstream_failure_hides_detail() {
        let h = Harness::request_mode(true);
        let body = json!({ "question": QUESTION, "context": CONTEXT }).to_string();

        let res = h.send(post_chat(body)).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let v = json_body(res).await;
        assert_eq!(v["error"], GatewayMessages::default().upstream_failure);
        assert!(!v.to_string().contains("quota"));
        assert_eq!(h.calls(), 1);
    }

    #[tokio::test]
    async fn health_is_stable() {
        let h = Harness::request_mode(false);
        let expected = json!({ "status": "OK", "message": "Server is up and running" });

        for _ in 0..3 {
            let res = h.send(get("/api/health")).await;
            assert_eq!(res.status(), StatusCode::OK);
            assert_eq!(json_body(res).await, expected);
        }
        assert_eq!(h.calls(), 0);
    }

    #[tokio::test]
    async fn ready_in_request_mode() {
        let h = Harness::request_mode(false);
        let res = h.send(get("/api/ready")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, json!({ "status": "ready" }));
    }

    #[tokio::test]
    async fn ready_tracks_corpus_load() {
        let kb = KnowledgeBase::new();
        let h = Harness::new(GroundingMode::PreloadedCorpus, None, kb.clone());

        let res = h.send(get("/api/ready")).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(res).await, json!({ "status": "loading" }));

        kb.publish_text(CONTEXT.to_string(), CorpusSource::Inline);
        let res = h.send(get("/api/ready")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let v = json_body(res).await;
        assert_eq!(v["status"], "ready");
        assert_eq!(v["chars"], CONTEXT.chars().count());
    }

    #[tokio::test]
    async fn ready_reports_degraded_corpus() {
        let kb = KnowledgeBase::new();
        kb.publish_failure("no local knowledge file and no fallback url configured");
        let h = Harness::new(GroundingMode::PreloadedCorpus, None, kb);

        let res = h.send(get("/api/ready")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["status"], "degraded");
    }

    #[tokio::test]
    async fn corpus_mode_needs_only_question() {
        let h = Harness::new(
            GroundingMode::PreloadedCorpus,
            Some(StubGenerator {
                fail: false,
                calls: AtomicUsize::new(0),
            }),
            KnowledgeBase::preloaded(CONTEXT),
        );

        let res = h.send(post_chat(json!({ "question": QUESTION }).to_string())).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(h.calls(), 1);

        let res = h.send(post_chat("{}")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(res).await["error"],
            GatewayMessages::default().missing_question
        );
        assert_eq!(h.calls(), 1);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let gateway = ChatGateway::new(
            GatewayConfig::default(),
            PromptTemplate::default(),
            Some(Arc::new(StubGenerator {
                fail: false,
                calls: AtomicUsize::new(0),
            }) as Arc<dyn TextGenerator>),
            KnowledgeBase::new(),
        );
        let cfg = ApiConfig {
            max_body_bytes: 64,
            ..ApiConfig::default()
        };
        let router = build_router(AppState::new(gateway), &cfg);

        let big = json!({ "question": "q", "context": "x".repeat(1024) }).to_string();
        let res = router.oneshot(post_chat(big)).await.unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
