//! Axum router configuration with middleware.
//!
//! All routes are under `/api/`.
//! Middleware: body limit, CORS, tracing.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Request body ceiling: a 10 MiB image still fits after base64 inflation.
pub const MAX_BODY_BYTES: usize = 15 * 1024 * 1024;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/chat", post(handlers::chat::chat_turn))
        .route(
            "/chat/history/{agent_id}",
            get(handlers::history::get_history).delete(handlers::history::clear_history),
        )
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use avinci_core::llm::box_provider::{BoxLlmProvider, BoxVisionProvider};
    use avinci_core::llm::provider::{LlmProvider, VisionProvider};
    use avinci_infra::sqlite::pool::DatabasePool;
    use avinci_types::config::AvinciConfig;
    use avinci_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage, VisionRequest};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct CannedLlm {
        reply: Result<String, ()>,
        calls: Arc<AtomicUsize>,
    }

    impl LlmProvider for CannedLlm {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(CompletionResponse {
                    id: "resp-1".to_string(),
                    content: text.clone(),
                    model: request.model.clone(),
                    usage: Usage {
                        input_tokens: 80,
                        output_tokens: 12,
                    },
                }),
                Err(()) => Err(LlmError::Provider {
                    message: "internal key sk-live-123 rejected".to_string(),
                }),
            }
        }
    }

    struct CannedVision;

    impl VisionProvider for CannedVision {
        fn name(&self) -> &str {
            "canned"
        }

        async fn describe_image(&self, _request: &VisionRequest<'_>) -> Result<String, LlmError> {
            Ok("A login form with a faint password label.".to_string())
        }
    }

    struct TestApp {
        router: Router,
        llm_calls: Arc<AtomicUsize>,
        _dir: tempfile::TempDir,
    }

    async fn app(reply: Result<String, ()>) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(dir.path()).await.unwrap();
        insert_agent(&pool).await;

        let llm_calls = Arc::new(AtomicUsize::new(0));
        let llm = BoxLlmProvider::new(CannedLlm {
            reply,
            calls: llm_calls.clone(),
        });
        let vision = BoxVisionProvider::new(CannedVision);

        let state = AppState::from_parts(
            AvinciConfig::default(),
            dir.path().to_path_buf(),
            pool,
            llm,
            vision,
        );
        TestApp {
            router: build_router(state),
            llm_calls,
            _dir: dir,
        }
    }

    // Low hesitation keeps fillers out of the reply.
    async fn insert_agent(pool: &DatabasePool) {
        sqlx::query(
            "INSERT INTO agents (id, name, persona, emotional_range, hesitation_level)
             VALUES ('agent-1', 'Dana', 'senior designer', 'Reserved', 'Low')",
        )
        .execute(&pool.writer)
        .await
        .unwrap();
    }

    fn post_json(uri: &str, caller: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-caller-id", caller)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn request(method: &str, uri: &str, caller: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("x-caller-id", caller)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(Ok("hi".into())).await;
        let response = app
            .router
            .oneshot(request("GET", "/api/health", "c1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sessionBackend"], "memory");
    }

    #[tokio::test]
    async fn test_chat_turn_then_history() {
        let app = app(Ok("The label is too faint.".into())).await;

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/api/chat",
                "c1",
                json!({"agentId": "agent-1", "text": "What do you think?"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["agentId"], "agent-1");
        assert_eq!(body["tokens"], 12);
        assert_eq!(body["message"]["isUser"], false);
        assert_eq!(body["message"]["metadata"]["model"], "gpt-4o");

        let response = app
            .router
            .clone()
            .oneshot(request("GET", "/api/chat/history/agent-1", "c1"))
            .await
            .unwrap();
        let body = json_body(response).await;
        let conversation = body["conversation"].as_array().unwrap();
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation[0]["text"], "What do you think?");
        assert_eq!(conversation[0]["isUser"], true);

        // A different caller sees its own, empty session.
        let response = app
            .router
            .oneshot(request("GET", "/api/chat/history/agent-1", "c2"))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert!(body["conversation"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_history_reports_success() {
        let app = app(Ok("ok".into())).await;
        app.router
            .clone()
            .oneshot(post_json(
                "/api/chat",
                "c1",
                json!({"agentId": "agent-1", "text": "hello"}),
            ))
            .await
            .unwrap();

        let response = app
            .router
            .clone()
            .oneshot(request("DELETE", "/api/chat/history/agent-1", "c1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["success"], true);

        let response = app
            .router
            .oneshot(request("GET", "/api/chat/history/agent-1", "c1"))
            .await
            .unwrap();
        assert!(json_body(response).await["conversation"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_text_is_400_without_model_call() {
        let app = app(Ok("unused".into())).await;
        let response = app
            .router
            .oneshot(post_json("/api/chat", "c1", json!({"agentId": "agent-1"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["errors"][0]["code"], "VALIDATION_ERROR");
        assert_eq!(app.llm_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let app = app(Ok("unused".into())).await;
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_agent_is_404() {
        let app = app(Ok("unused".into())).await;
        let response = app
            .router
            .oneshot(post_json(
                "/api/chat",
                "c1",
                json!({"agentId": "ghost", "text": "hello"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["errors"][0]["code"], "AGENT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_502_and_hides_detail() {
        let app = app(Err(())).await;
        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/api/chat",
                "c1",
                json!({"agentId": "agent-1", "text": "hello"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert!(!body.to_string().contains("sk-live-123"));

        // Nothing recorded after a failed turn.
        let response = app
            .router
            .oneshot(request("GET", "/api/chat/history/agent-1", "c1"))
            .await
            .unwrap();
        assert!(json_body(response).await["conversation"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_image_type_is_400() {
        let app = app(Ok("unused".into())).await;
        let response = app
            .router
            .oneshot(post_json(
                "/api/chat",
                "c1",
                json!({
                    "agentId": "agent-1",
                    "text": "look",
                    "image": {"data": "YWJj", "mimeType": "application/pdf"}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(app.llm_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_image_turn_succeeds() {
        let app = app(Ok("That label is hard to read.".into())).await;
        let response = app
            .router
            .oneshot(post_json(
                "/api/chat",
                "c1",
                json!({
                    "agentId": "agent-1",
                    "text": "Thoughts on this screen?",
                    "image": {"data": "data:image/png;base64,YWJj"}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.llm_calls.load(Ordering::SeqCst), 1);
    }
}
