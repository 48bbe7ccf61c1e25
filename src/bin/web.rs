//! Hive HTTP 服务
//!
//! 启动: cargo run --bin hive-web --features web
//! 浏览器访问 http://127.0.0.1:8000

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use futures_util::stream;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use hive::agents::AgentKind;
use hive::config::{load_config, AppConfig};
use hive::core::{AgentBuilder, AgentComponents, ChatRequest, Orchestrator};
use hive::llm::ApiKeyStore;

struct AppState {
    config: AppConfig,
    api_key: ApiKeyStore,
    components: Arc<AgentComponents>,
}

#[derive(Deserialize)]
struct ApiKeyRequest {
    api_key: String,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn bad_request(detail: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail })))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hive::observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });
    let api_key = ApiKeyStore::new(cfg.llm.resolved_api_key());
    let components = Arc::new(AgentBuilder::new(cfg.clone(), api_key.clone()).build());

    let state = Arc::new(AppState {
        config: cfg.clone(),
        api_key,
        components,
    });

    let mut app = Router::new()
        .route("/chat", post(chat))
        .route("/set-api-key", post(set_api_key))
        .route("/health", get(health))
        .route("/api/status", get(api_status));

    let static_dir = &cfg.server.static_dir;
    if static_dir.join("index.html").exists() {
        tracing::info!("Serving frontend from {}", static_dir.display());
        app = app.fallback_service(ServeDir::new(static_dir));
    } else {
        tracing::warn!("No frontend at {}, serving API only", static_dir.display());
        app = app.route("/", get(frontend_missing));
    }

    let app = app
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    tracing::info!("{}: http://{}", cfg.app.display_name(), addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// POST /chat：跑一轮编排，以 NDJSON 流式返回状态事件；客户端断开即停止
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    if !state.config.llm.is_mock() && !state.api_key.is_configured().await {
        return Err(bad_request(
            "Gemini API key not configured. Please set your API key first.",
        ));
    }
    let message = req.message.trim();
    if message.is_empty() {
        return Err(bad_request("message is required"));
    }

    tracing::info!(turns = req.conversation_history.len(), "chat request");

    let orchestrator = Orchestrator::new(state.components.clone(), req.conversation_history);
    let (events, _handle) = orchestrator.stream(message);

    let stream = stream::unfold(events, |mut events| async move {
        let event = events.recv().await?;
        Some((
            Ok::<_, std::convert::Infallible>(Bytes::from(event.to_ndjson())),
            events,
        ))
    });

    let mut res = Response::new(Body::from_stream(stream));
    let headers = res.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/x-ndjson; charset=utf-8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(res)
}

/// POST /set-api-key：运行时替换凭据，后续模型调用立即生效
async fn set_api_key(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ApiKeyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.api_key.trim().is_empty() {
        return Err(bad_request("api_key is required"));
    }
    state.api_key.set(req.api_key).await;
    tracing::info!("API key updated");
    Ok(Json(json!({ "status": "success", "message": "API key set successfully" })))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": state.config.app.display_name(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn api_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let agents: Vec<&str> = AgentKind::ALL.iter().map(|k| k.key()).collect();
    Json(json!({
        "api_key_configured": state.api_key.is_configured().await,
        "agents_available": agents,
        "tools_available": state.components.tools.tool_names(),
    }))
}

async fn frontend_missing(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "message": format!("{} API", state.config.app.display_name()),
        "status": "Frontend not available - please build the frontend into the static directory",
    }))
}
