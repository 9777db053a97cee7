//! HTTP front for the chat engine: `/chat`, `/reload` and the bundled
//! single-page front-end.

use axum::{
    extract::{rejection::JsonRejection, State},
    handler::HandlerWithoutStateExt,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::services::ServeDir;

use campusbot::{ChatEngine, ChatError, ChatTurn};

pub const SESSION_HEADER: &str = "x-session-id";
pub const NO_MESSAGE_REPLY: &str = "No message received.";
pub const INTERNAL_ERROR_REPLY: &str = "Internal server error.";
pub const RELOAD_OK: &str = "Dataset reloaded successfully ✅";
pub const RELOAD_FAILED: &str = "Dataset reload failed; serving an empty dataset";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "conversationId", alias = "conversation_id")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub message: String,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
}

impl AppState {
    pub fn new(engine: ChatEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

fn reply(status: StatusCode, text: impl Into<String>) -> Response {
    (status, Json(ChatResponse { reply: text.into() })).into_response()
}

async fn handle_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("Rejected /chat body: {}", rejection.body_text());
            return reply(StatusCode::BAD_REQUEST, NO_MESSAGE_REPLY);
        }
    };

    let session_id = request.conversation_id.or_else(|| {
        headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    });
    let turn = ChatTurn::new(request.message.unwrap_or_default(), session_id);

    match state.engine.respond(&turn).await {
        Ok(answer) => reply(StatusCode::OK, answer.text),
        Err(ChatError::EmptyMessage) => reply(StatusCode::BAD_REQUEST, NO_MESSAGE_REPLY),
    }
}

async fn handle_reload(State(state): State<AppState>) -> Json<ReloadResponse> {
    let message = match state.engine.dataset().load() {
        Ok(count) => {
            tracing::info!("🔄 Dataset reloaded ({} entries)", count);
            RELOAD_OK
        }
        Err(e) => {
            tracing::error!("🔄 Dataset reload failed: {}", e);
            RELOAD_FAILED
        }
    };
    Json(ReloadResponse {
        message: message.to_string(),
    })
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("❌ Request handler panicked: {}", detail);
    reply(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_REPLY)
}

async fn serve_index(index: PathBuf) -> Response {
    match tokio::fs::read_to_string(&index).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!("Front-end entry {} unavailable: {}", index.display(), e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Router with the API routes, permissive CORS, panic-to-500 conversion and
/// the front-end under `frontend_dir`. Any request no route or file answers,
/// whatever its method, gets `index.html`.
pub fn build_router(state: AppState, frontend_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    let index = frontend_dir.join("index.html");
    let spa_index = move || serve_index(index.clone());
    let frontend = ServeDir::new(frontend_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(spa_index.into_service());

    Router::new()
        .route("/chat", post(handle_chat).fallback_service(frontend.clone()))
        .route("/reload", get(handle_reload).fallback_service(frontend.clone()))
        .fallback_service(frontend)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .with_state(state)
}
