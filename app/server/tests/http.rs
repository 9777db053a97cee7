use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use campusbot::personality::CREATOR_ATTRIBUTION;
use campusbot::web::no_answer_message;
use campusbot::{AnswerProvider, BotConfig, ChatEngine, ChatTurn, QaDataset};
use campusbot_server::{build_router, AppState, INTERNAL_ERROR_REPLY, NO_MESSAGE_REPLY, RELOAD_FAILED, RELOAD_OK};

const DATASET: &str = r#"[
    {"question": "What is the hostel fee?", "answer": "Hostel fee is ₹40,000 per year."},
    {"question": "Library timing", "answer": "Library is open 9 AM to 5 PM."}
]"#;

struct Harness {
    app: Router,
    server: MockServer,
    _dir: tempfile::TempDir,
    data_path: std::path::PathBuf,
}

/// Router whose LLM and web sources all point at one mock server.
async fn harness(api_key: Option<&str>) -> Harness {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("data.json");
    std::fs::write(&data_path, DATASET).unwrap();
    std::fs::write(dir.path().join("index.html"), "<html><body>campus chat</body></html>").unwrap();

    let mut config = BotConfig::default();
    config.dataset_path = data_path.clone();
    config.llm.api_key = api_key.map(str::to_string);
    config.llm.endpoint = format!("{}/openai/v1/chat/completions", server.uri());
    config.llm.timeout_secs = 5;
    config.web.search_base_url = server.uri();
    config.web.instant_answer_base_url = server.uri();
    config.web.encyclopedia_base_url = server.uri();
    config.web.search_timeout_secs = 5;
    config.web.page_timeout_secs = 5;
    config.web.instant_answer_timeout_secs = 5;
    config.web.encyclopedia_timeout_secs = 5;

    let engine = ChatEngine::from_config(&config).unwrap();
    engine.dataset().load().unwrap();
    let app = build_router(AppState::new(engine), dir.path());

    Harness {
        app,
        server,
        _dir: dir,
        data_path,
    }
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn test_empty_message_is_bad_request() {
    let h = harness(None).await;
    let (status, body) = send_json(&h.app, chat_request(json!({"message": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"reply": NO_MESSAGE_REPLY}));

    let (status, body) = send_json(&h.app, chat_request(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reply"], NO_MESSAGE_REPLY);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let h = harness(None).await;
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send_json(&h.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reply"], NO_MESSAGE_REPLY);
}

#[tokio::test]
async fn test_dataset_answer() {
    let h = harness(None).await;
    let (status, body) = send_json(&h.app, chat_request(json!({"message": "hostel fee?"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Hostel fee is ₹40,000 per year.");
}

#[tokio::test]
async fn test_creator_question_gets_attribution() {
    let h = harness(Some("gsk-test")).await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "I was created by Meta AI."}}]
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let (status, body) = send_json(&h.app, chat_request(json!({"message": "who created you"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], CREATOR_ATTRIBUTION);
}

#[tokio::test]
async fn test_no_credential_uses_web_chain() {
    let h = harness(None).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AbstractText": "Patna is the capital of the Indian state of Bihar.",
            "RelatedTopics": []
        })))
        .mount(&h.server)
        .await;

    let (status, body) =
        send_json(&h.app, chat_request(json!({"message": "capital of bihar"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["reply"],
        "From DuckDuckGo: Patna is the capital of the Indian state of Bihar."
    );

    let llm_calls = h
        .server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().starts_with("/openai"))
        .count();
    assert_eq!(llm_calls, 0);
}

#[tokio::test]
async fn test_every_dependency_down_still_replies() {
    let h = harness(Some("gsk-test")).await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.server)
        .await;

    let (status, body) =
        send_json(&h.app, chat_request(json!({"message": "quantum gravity"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], no_answer_message("quantum gravity"));
}

#[tokio::test]
async fn test_person_dialogue_is_session_scoped() {
    let h = harness(None).await;

    let (_, body) = send_json(
        &h.app,
        chat_request(json!({"message": "who is Priya", "conversationId": "alice"})),
    )
    .await;
    assert_eq!(body["reply"], "Is she from RRSDEC Begusarai?");

    // another session's "yes" does not consume alice's question
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .header("x-session-id", "bob")
        .body(Body::from(json!({"message": "yes"}).to_string()))
        .unwrap();
    let (_, body) = send_json(&h.app, request).await;
    assert_eq!(body["reply"], no_answer_message("yes"));

    let (_, body) = send_json(
        &h.app,
        chat_request(json!({"message": "yes", "conversation_id": "alice"})),
    )
    .await;
    assert!(body["reply"].as_str().unwrap().starts_with("Aree Priya"));
}

struct Exploding;

#[async_trait]
impl AnswerProvider for Exploding {
    fn name(&self) -> &str {
        "exploding"
    }

    async fn attempt(&self, _turn: &ChatTurn) -> Option<String> {
        panic!("tier blew up");
    }
}

#[tokio::test]
async fn test_panic_becomes_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let engine = ChatEngine::new(
        vec![Arc::new(Exploding)],
        Arc::new(QaDataset::from_entries(Vec::new())),
    );
    let app = build_router(AppState::new(engine), dir.path());

    let (status, body) = send_json(&app, chat_request(json!({"message": "boom"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"reply": INTERNAL_ERROR_REPLY}));
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_reload_replaces_dataset() {
    let h = harness(None).await;
    std::fs::write(
        &h.data_path,
        r#"[{"question": "exam dates", "answer": "Exams start in May."}]"#,
    )
    .unwrap();

    let (status, body) = send_json(&h.app, get("/reload")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": RELOAD_OK}));

    let (_, body) = send_json(&h.app, chat_request(json!({"message": "exam dates"}))).await;
    assert_eq!(body["reply"], "Exams start in May.");
}

#[tokio::test]
async fn test_reload_failure_reports_empty_dataset() {
    let h = harness(None).await;
    std::fs::write(&h.data_path, "{broken").unwrap();

    let (status, body) = send_json(&h.app, get("/reload")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], RELOAD_FAILED);
}

#[tokio::test]
async fn test_unknown_route_serves_front_end() {
    let h = harness(None).await;
    let (status, body) = send(&h.app, get("/some/client/route")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("campus chat"));

    let (status, body) = send(&h.app, get("/index.html")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("campus chat"));
}

#[tokio::test]
async fn test_front_end_served_for_any_method() {
    let h = harness(None).await;
    let (status, body) = send(&h.app, get("/chat")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("campus chat"));

    let request = Request::builder()
        .method("POST")
        .uri("/some/client/route")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("campus chat"));
}
