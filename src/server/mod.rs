//! HTTP transport binding
//!
//! A thin axum adapter over the engine: one `POST /execute/{language}`
//! endpoint per language plus a health check. Requests run on the blocking
//! pool so a long execution never stalls the reactor.

pub mod rate_limit;

use crate::config::settings::EngineConfig;
use crate::config::types::{ExecutionRequest, Language};
use crate::exec::orchestrator::Engine;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use rate_limit::RateLimiter;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

type ApiResult = std::result::Result<Json<Value>, (StatusCode, Json<Value>)>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    engine: Arc<Engine>,
    limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        let limits = &engine.config().rate_limit;
        let limiter = RateLimiter::new(limits.max_requests, Duration::from_secs(limits.window_secs));
        Self {
            engine: Arc::new(engine),
            limiter: Arc::new(limiter),
        }
    }
}

/// Body of an execute request
#[derive(Debug, Deserialize)]
pub struct ExecuteBody {
    pub code: Option<String>,
    pub input: Option<String>,
}

fn client_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "codebox execution service is running",
    }))
}

async fn execute_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(language): Path<String>,
    body: std::result::Result<Json<ExecuteBody>, JsonRejection>,
) -> ApiResult {
    if !state.limiter.check(peer.ip()) {
        log::warn!("Rate limit exceeded for {}", peer.ip());
        return Err(client_error(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests, please try again later",
        ));
    }

    let language: Language = language
        .parse()
        .map_err(|e: crate::config::types::EngineError| {
            client_error(StatusCode::BAD_REQUEST, e.to_string())
        })?;

    let Json(body) = body.map_err(|e| client_error(StatusCode::BAD_REQUEST, e.body_text()))?;
    let code = body.code.unwrap_or_default();
    let request = ExecutionRequest::new(language, code, body.input)
        .map_err(|_| client_error(StatusCode::BAD_REQUEST, "Code is required"))?;

    log::info!("Execute request from {} for {}", peer.ip(), language);
    let engine = Arc::clone(&state.engine);
    let outcome = tokio::task::spawn_blocking(move || engine.execute(&request))
        .await
        .map_err(|e| {
            log::error!("Execution task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Execution failed unexpectedly" })),
            )
        })?;

    Ok(Json(json!({ "output": outcome.into_output() })))
}

/// Build the router. Callers must serve it with connect info so the rate
/// limiter can see client addresses.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/execute/{language}", post(execute_handler))
        .with_state(state)
}

/// Sweep stale workspaces, bind, and serve until Ctrl-C
pub async fn serve(config: EngineConfig, bind: SocketAddr) -> anyhow::Result<()> {
    let stale_age = config.stale_workspace_age();
    let engine = Engine::new(config)?;

    match engine.workspaces().sweep_stale(stale_age) {
        Ok(0) => {}
        Ok(n) => log::info!("Removed {} stale workspace(s)", n),
        Err(e) => log::warn!("Stale workspace sweep failed: {}", e),
    }

    let app = router(AppState::new(engine));
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", bind, e))?;
    log::info!("codebox listening on http://{}", bind);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        log::info!("Shutdown signal received");
    })
    .await?;

    Ok(())
}
