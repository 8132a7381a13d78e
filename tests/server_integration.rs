/// HTTP binding tests, driven through the router without a socket.
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use codebox::server::{router, AppState};
use codebox::{Engine, EngineConfig};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower::ServiceExt;

fn app_with(tweak: impl FnOnce(&mut EngineConfig)) -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = EngineConfig {
        temp_root: dir.path().join("workspaces"),
        ..EngineConfig::default()
    };
    tweak(&mut config);
    let engine = Engine::new(config).unwrap();
    let app = router(AppState::new(engine))
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));
    (dir, app)
}

fn app() -> (tempfile::TempDir, Router) {
    app_with(|_| {})
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let (_dir, app) = app();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn missing_or_empty_code_is_bad_request() {
    let (_dir, app) = app();

    let (status, body) = send(&app, post_json("/execute/python", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, post_json("/execute/python", json!({ "code": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (_dir, app) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/execute/python")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_language_is_bad_request() {
    let (_dir, app) = app();
    let (status, body) =
        send(&app, post_json("/execute/cobol", json!({ "code": "DISPLAY 'HI'" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("cobol"));
}

#[tokio::test]
async fn client_over_budget_gets_too_many_requests() {
    let (_dir, app) = app_with(|c| c.rate_limit.max_requests = 1);

    let (status, _) = send(&app, post_json("/execute/python", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, post_json("/execute/python", json!({}))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn pipeline_failures_are_reported_as_output() {
    let (_dir, app) = app();
    let (status, body) = send(
        &app,
        post_json(
            "/execute/c",
            json!({ "code": "#include <sys/mman.h>\nint main(void){return 0;}" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["output"].as_str().unwrap().contains("<sys/mman.h>"));
}

#[tokio::test]
async fn python_execution_round_trip() {
    let python = std::process::Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !python {
        eprintln!("skipping: python3 not available");
        return;
    }

    let (_dir, app) = app();
    let (status, body) = send(
        &app,
        post_json(
            "/execute/python",
            json!({ "code": "print(input().upper())", "input": "shout" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "output": "SHOUT\n" }));
}
