// ABOUTME: Integration tests for HttpResearchProvider against a wiremock research API
// ABOUTME: Covers both transports, response classification, cancel outcomes, and PDF download

use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scout_research::{
    CancelOutcome, CreateTaskRequest, Credential, HttpResearchProvider, ResearchError,
    ResearchProvider, TaskStatus, Transport,
};

const API_KEY: &str = "sk-test";

fn direct(server: &MockServer) -> HttpResearchProvider {
    HttpResearchProvider::new(
        Transport::Direct {
            base_url: server.uri(),
            api_key: API_KEY.to_string(),
        },
        Duration::from_secs(5),
    )
    .unwrap()
}

fn proxy(server: &MockServer) -> HttpResearchProvider {
    HttpResearchProvider::new(
        Transport::Proxy {
            proxy_url: format!("{}/api/oauth/proxy", server.uri()),
        },
        Duration::from_secs(5),
    )
    .unwrap()
}

fn request() -> CreateTaskRequest {
    CreateTaskRequest::new("Analyze", vec!["https://acme.example".to_string()], "fast")
}

#[tokio::test]
async fn test_direct_create_task_sends_api_key_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/deepresearch"))
        .and(header("x-api-key", API_KEY))
        .and(body_json(json!({
            "input": "Analyze",
            "model": "fast",
            "urls": ["https://acme.example"],
            "output_formats": ["markdown", "pdf"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "deepresearch_id": "t_1",
            "status": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let task_id = direct(&server)
        .create_task(&request(), &Credential::none())
        .await
        .unwrap();

    assert_eq!(task_id, "t_1");
}

#[tokio::test]
async fn test_proxy_wraps_calls_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/oauth/proxy"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({
            "path": "/v1/deepresearch/t_1",
            "method": "GET",
            "body": {}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deepresearch_id": "t_1",
            "status": "running",
            "progress": {"current_step": 2, "total_steps": 5}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let task = proxy(&server)
        .get_status("t_1", &Credential::bearer("tok"))
        .await
        .unwrap();

    assert_eq!(task.status, TaskStatus::Running);
    assert_eq!(task.progress.map(|p| p.current_step), Some(2));
}

#[tokio::test]
async fn test_proxy_without_credential_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = proxy(&server)
        .create_task(&request(), &Credential::none())
        .await
        .unwrap_err();

    assert!(err.is_auth_required());
}

#[tokio::test]
async fn test_path_like_task_id_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = proxy(&server);
    let credential = Credential::bearer("tok");

    let err = provider.get_status("../admin", &credential).await.unwrap_err();
    assert!(matches!(err, ResearchError::Validation(_)));

    let err = provider
        .cancel_task("t_1?force=1", &credential)
        .await
        .unwrap_err();
    assert!(matches!(err, ResearchError::Validation(_)));
}

#[tokio::test]
async fn test_completed_status_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/deepresearch/t_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "deepresearch_id": "t_1",
            "status": "completed",
            "output": "R",
            "sources": [{"title": "A", "url": "https://a.example"}],
            "usage": {"search_cost": 0.1, "ai_cost": 0.3, "compute_cost": 0.02, "total_cost": 0.42},
            "pdf_url": "https://cdn.example/r.pdf",
            "progress": {"current_step": 9, "total_steps": 5}
        })))
        .mount(&server)
        .await;

    let task = direct(&server)
        .get_status("t_1", &Credential::none())
        .await
        .unwrap();

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.output.as_deref(), Some("R"));
    assert_eq!(task.sources.len(), 1);
    assert_eq!(task.usage.map(|u| u.total_cost), Some(0.42));
    assert_eq!(task.pdf_url.as_deref(), Some("https://cdn.example/r.pdf"));
    // current > total is dropped
    assert_eq!(task.progress, None);
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_required() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "AUTH_REQUIRED",
            "message": "Sign in with Valyu to continue."
        })))
        .mount(&server)
        .await;

    let err = proxy(&server)
        .get_status("t_1", &Credential::bearer("expired"))
        .await
        .unwrap_err();

    match err {
        ResearchError::AuthRequired(msg) => assert_eq!(msg, "Sign in with Valyu to continue."),
        other => panic!("expected auth required, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = direct(&server)
        .get_status("t_1", &Credential::none())
        .await
        .unwrap_err();

    assert!(err.is_transient());
}

#[tokio::test]
async fn test_timeout_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let provider = HttpResearchProvider::new(
        Transport::Direct {
            base_url: server.uri(),
            api_key: API_KEY.to_string(),
        },
        Duration::from_millis(100),
    )
    .unwrap();

    let err = provider
        .get_status("t_1", &Credential::none())
        .await
        .unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_create_without_task_id_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let err = direct(&server)
        .create_task(&request(), &Credential::none())
        .await
        .unwrap_err();

    assert!(matches!(err, ResearchError::Provider(_)));
}

#[tokio::test]
async fn test_client_error_carries_body_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Unknown model 'huge'"})),
        )
        .mount(&server)
        .await;

    let err = direct(&server)
        .create_task(&request(), &Credential::none())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Provider error: Unknown model 'huge'");
}

#[tokio::test]
async fn test_unknown_status_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"deepresearch_id": "t_1", "status": "paused"})),
        )
        .mount(&server)
        .await;

    let err = direct(&server)
        .get_status("t_1", &Credential::none())
        .await
        .unwrap_err();

    assert!(matches!(err, ResearchError::Provider(_)));
}

#[tokio::test]
async fn test_cancel_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/deepresearch/t_1/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = direct(&server)
        .cancel_task("t_1", &Credential::none())
        .await
        .unwrap();

    assert_eq!(outcome, CancelOutcome::Cancelled);
}

#[tokio::test]
async fn test_cancel_already_completed_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/deepresearch/t_1/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Task has already completed",
            "code": "task_already_completed"
        })))
        .mount(&server)
        .await;

    let outcome = direct(&server)
        .cancel_task("t_1", &Credential::none())
        .await
        .unwrap();

    assert_eq!(outcome, CancelOutcome::AlreadyTerminal);
}

#[tokio::test]
async fn test_cancel_conflict_is_already_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let outcome = direct(&server)
        .cancel_task("t_1", &Credential::none())
        .await
        .unwrap();

    assert_eq!(outcome, CancelOutcome::AlreadyTerminal);
}

#[tokio::test]
async fn test_cancel_rejection_without_code_is_cancellation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Task was completed by another worker"
        })))
        .mount(&server)
        .await;

    let err = direct(&server)
        .cancel_task("t_1", &Credential::none())
        .await
        .unwrap_err();

    // Error text mentioning "completed" is not treated as already terminal
    assert!(matches!(err, ResearchError::Cancellation(_)));
}

#[tokio::test]
async fn test_fetch_pdf() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reports/t_1.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
        .mount(&server)
        .await;

    let bytes = direct(&server)
        .fetch_pdf(&format!("{}/reports/t_1.pdf", server.uri()))
        .await
        .unwrap();

    assert_eq!(bytes, b"%PDF-1.7".to_vec());
}

#[tokio::test]
async fn test_fetch_pdf_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = direct(&server)
        .fetch_pdf(&format!("{}/reports/missing.pdf", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, ResearchError::Provider(_)));
}
