//! Router-level tests against a shell-script stand-in for the molt CLI.
#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use molt_dashboard::config::StateFiles;
use molt_dashboard::paths::StateLayout;
use molt_dashboard::process::MoltCli;
use molt_dashboard::server::{create_app, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt as _;

const LIST_JSON: &str = r#"{"molts":[{"name":"alpha","port":"18789","home":"/srv/alpha","status":"running (healthy)","pid":"4242","created":"2026-10-01 10:00","docker":"c1"},{"name":"beta","port":"18790","home":"/srv/beta","status":"stopped","pid":"-","created":"2026-10-02 09:00","docker":"-"}],"summary":{"total":2,"running":1,"stopped":1}}"#;

struct Harness {
    _dir: TempDir,
    app: Router,
    state_root: std::path::PathBuf,
}

impl Harness {
    fn state_file(&self, name: &str, file: &str) -> std::path::PathBuf {
        self.state_root.join(name).join(file)
    }
}

const CONFIG: &str = ".openclaw/openclaw.json";
const HEALTH: &str = ".molt-state/health-status.json";
const HISTORY: &str = ".molt-state/health-history.jsonl";
const WATCH: &str = ".molt-state/health-watch-state.json";

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// `script` is the body of a `sh` script receiving the CLI arguments.
fn harness(script: &str) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let script_path = dir.path().join("molt.sh");
    fs::write(&script_path, format!("{script}\n")).unwrap();

    let state_root = dir.path().join("state");
    fs::create_dir_all(&state_root).unwrap();
    let static_dir = dir.path().join("ui");
    write(&static_dir.join("index.html"), "<html>molt dashboard</html>");

    let state = AppState {
        cli: Arc::new(MoltCli::with_args("sh", vec![script_path.display().to_string()])),
        layout: Arc::new(StateLayout::new(&state_root, StateFiles::default())),
        client: reqwest::Client::new(),
        webhook_path: Arc::from("/hooks/agent"),
    };
    Harness {
        app: create_app(state, &static_dir),
        state_root,
        _dir: dir,
    }
}

fn list_script() -> String {
    format!("case \"$1\" in\n  list) echo '{LIST_JSON}' ;;\n  *) echo \"$*\" ;;\nesac")
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn liveness_reports_service() {
    let h = harness("exit 0");
    let (status, body) = call(&h.app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn lists_molts_with_state() {
    let h = harness(&list_script());
    let (status, body) = call(&h.app, "GET", "/api/molts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());
    assert_eq!(body["summary"], json!({"total": 2, "running": 1, "stopped": 1}));
    assert_eq!(body["molts"][0]["state"], "running");
    assert_eq!(body["molts"][0]["status"], "running (healthy)");
    assert_eq!(body["molts"][0]["port"], "18789");
    assert_eq!(body["molts"][0]["container"], "c1");
    assert_eq!(body["molts"][1]["state"], "stopped");
}

#[tokio::test]
async fn listing_failure_has_default_shape() {
    let h = harness("echo 'daemon unreachable' >&2; exit 1");
    let (status, body) = call(&h.app, "GET", "/api/molts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "Failed to list molts");
    assert_eq!(body["molts"], json!([]));
    assert_eq!(body["summary"], json!({"total": 0, "running": 0, "stopped": 0}));
}

#[tokio::test]
async fn start_stop_and_status_go_through_the_cli() {
    let h = harness(r#"echo "did $*""#);

    let (_, body) = call(&h.app, "POST", "/api/molts/alpha/start", None).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["output"], "did start alpha");

    let (_, body) = call(&h.app, "POST", "/api/molts/alpha/stop", None).await;
    assert_eq!(body["output"], "did stop alpha");

    let (_, body) = call(&h.app, "GET", "/api/molts/alpha/status", None).await;
    assert_eq!(body["status"], "did status alpha");
}

#[tokio::test]
async fn cli_failure_is_a_generic_error_body() {
    let h = harness("echo 'no such molt: ghost' >&2; exit 2");
    let (status, body) = call(&h.app, "POST", "/api/molts/ghost/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "Failed to start molt"}));
}

#[tokio::test]
async fn logs_are_split_and_line_count_forwarded() {
    let h = harness(r#"printf 'args %s\n' "$*"; printf 'line one\nline two\n'"#);
    let (_, body) = call(&h.app, "GET", "/api/molts/alpha/logs?lines=2", None).await;
    assert_eq!(
        body["lines"],
        json!(["args logs alpha -n 2", "line one", "line two"])
    );

    let (_, body) = call(&h.app, "GET", "/api/molts/alpha/logs?lines=bogus", None).await;
    assert_eq!(body["lines"][0], "args logs alpha -n 50");
}

#[tokio::test]
async fn dashboard_url_from_instance_config() {
    let h = harness("exit 0");
    write(
        &h.state_file("alpha", CONFIG),
        r#"{"gateway": {"port": 18789, "auth": {"token": "abc"}}}"#,
    );
    let (_, body) = call(&h.app, "GET", "/api/molts/alpha/dashboard", None).await;
    assert_eq!(body["url"], "http://127.0.0.1:18789/");

    let (_, body) = call(&h.app, "GET", "/api/molts/beta/dashboard", None).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn health_reads_status_file() {
    let h = harness("exit 0");
    write(
        &h.state_file("alpha", HEALTH),
        r#"{"status":"healthy","timestamp":"2026-10-18T09:00:00Z","pid":4242,"port":18789,"http_status":200,"response_time_ms":12}"#,
    );
    let (_, body) = call(&h.app, "GET", "/api/molts/alpha/health", None).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["http_status"], 200);
}

#[tokio::test]
async fn missing_health_files_use_default_bodies() {
    let h = harness("exit 0");

    let (status, body) = call(&h.app, "GET", "/api/molts/alpha/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unknown");
    assert!(body["error"].is_string());

    let (_, body) = call(&h.app, "GET", "/api/molts/alpha/history", None).await;
    assert_eq!(body["entries"], json!([]));
    assert_eq!(body["count"], 0);
    assert_eq!(body["uptime_percent"], 0);
    assert!(body["error"].is_string());

    let (_, body) = call(&h.app, "GET", "/api/molts/alpha/watch-state", None).await;
    assert_eq!(body["consecutive_failures"], 0);
    assert_eq!(body["alert_sent"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn corrupt_watch_state_uses_default_body() {
    let h = harness("exit 0");
    write(&h.state_file("alpha", WATCH), "{oops");
    let (_, body) = call(&h.app, "GET", "/api/molts/alpha/watch-state", None).await;
    assert_eq!(body["alert_sent"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn history_truncates_but_counts_everything() {
    let h = harness("exit 0");
    let mut lines = String::new();
    for i in 0..80 {
        let status = if i % 4 == 0 { "unhealthy" } else { "healthy" };
        lines.push_str(&format!(
            "{{\"status\":\"{status}\",\"timestamp\":\"t{i}\",\"response_time_ms\":10}}\n"
        ));
    }
    write(&h.state_file("alpha", HISTORY), &lines);

    let (_, body) = call(&h.app, "GET", "/api/molts/alpha/history", None).await;
    assert_eq!(body["count"], 80);
    assert_eq!(body["entries"].as_array().unwrap().len(), 50);
    assert_eq!(body["entries"][0]["timestamp"], "t30");
    assert_eq!(body["entries"][49]["timestamp"], "t79");
    assert_eq!(body["uptime_percent"], 75.0);
}

#[tokio::test]
async fn malformed_history_uses_default_body() {
    let h = harness("exit 0");
    write(
        &h.state_file("alpha", HISTORY),
        "{\"status\":\"healthy\"}\n{oops\n{\"status\":\"dead\"}\n",
    );
    let (status, body) = call(&h.app, "GET", "/api/molts/alpha/history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "Failed to read health history");
    assert_eq!(body["entries"], json!([]));
    assert_eq!(body["count"], 0);
    assert_eq!(body["uptime_percent"], 0);
}

#[tokio::test]
async fn invalid_names_never_touch_the_filesystem() {
    let h = harness("exit 0");
    // what `<root>/../` would resolve to
    write(
        &h.state_root.parent().unwrap().join(HEALTH),
        r#"{"status":"healthy"}"#,
    );
    let (_, body) = call(&h.app, "GET", "/api/molts/..%2F/health", None).await;
    assert_eq!(body["status"], "unknown");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn health_setup_reports_via_status_code() {
    let h = harness(r#"echo "$*""#);
    let (status, body) = call(
        &h.app,
        "POST",
        "/api/molts/alpha/health/setup",
        Some(json!({"interval": 120})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"], "health setup alpha --interval 120");

    let (status, _) = call(
        &h.app,
        "POST",
        "/api/molts/alpha/health/setup",
        Some(json!({"interval": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let failing = harness("exit 1");
    let (status, body) = call(&failing.app, "POST", "/api/molts/alpha/health/setup", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert_eq!(body["code"], 2001);
}

#[tokio::test]
async fn broadcast_requires_a_message() {
    let h = harness(&list_script());
    let (_, body) = call(&h.app, "POST", "/api/broadcast", Some(json!({"message": "  "}))).await;
    assert_eq!(body, json!({"error": "Message is required"}));
}

#[tokio::test]
async fn broadcast_with_no_running_instances() {
    let h = harness(r#"echo '{"molts":[{"name":"beta","status":"stopped"}],"summary":{"total":1,"running":0,"stopped":1}}'"#);
    let (_, body) = call(&h.app, "POST", "/api/broadcast", Some(json!({"message": "hello"}))).await;
    assert_eq!(body["recipients"], json!([]));
    assert_eq!(body["successful"], 0);
}

#[tokio::test]
async fn broadcast_delivers_to_running_instances() {
    let mut webhook = mockito::Server::new_async().await;
    let mock = webhook
        .mock("POST", "/hooks/agent")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .create_async()
        .await;
    let port = webhook.host_with_port().rsplit(':').next().unwrap().to_string();

    let h = harness(&list_script());
    write(
        &h.state_file("alpha", CONFIG),
        &format!(r#"{{"gateway": {{"port": {port}}}, "hooks": {{"token": "tok"}}}}"#),
    );

    let (_, body) = call(&h.app, "POST", "/api/broadcast", Some(json!({"message": "hello"}))).await;
    mock.assert_async().await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["successful"], 1);
    assert_eq!(body["recipients"][0], json!({"name": "alpha", "status": "sent"}));
}

#[tokio::test]
async fn unknown_paths_serve_the_ui() {
    let h = harness("exit 0");
    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/molts/alpha").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<html>molt dashboard</html>");
}
