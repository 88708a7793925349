//! HTTP server: JSON API plus the static browser UI.

mod fallback;
mod handlers;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::Client;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::DashboardConfig;
use crate::error::{AppError, ErrorKind, Result};
use crate::paths::StateLayout;
use crate::process::MoltCli;

/// Shared, read-only request context. The server keeps no mutable state.
#[derive(Clone)]
pub struct AppState {
    pub cli: Arc<MoltCli>,
    pub layout: Arc<StateLayout>,
    pub client: Client,
    pub webhook_path: Arc<str>,
}

impl AppState {
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        let root = config.resolve_state_root()?;
        log::info!("Reading instance state from {}", root.display());

        // No timeout: a slow webhook only delays its own broadcast entry.
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            cli: Arc::new(MoltCli::with_args(
                config.resolve_cli_bin(&root),
                config.cli_args.clone(),
            )),
            layout: Arc::new(StateLayout::new(root, config.files.clone())),
            client,
            webhook_path: Arc::from(config.webhook_path.as_str()),
        })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::InvalidName | ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = self
            .detail()
            .map_or_else(|| format!("{:?}", self.kind()), str::to_string);
        (
            status,
            Json(json!({ "error": message, "code": self.kind().code() })),
        )
            .into_response()
    }
}

/// Build the router. Unknown paths serve the UI's `index.html`.
pub fn create_app(state: AppState, static_dir: &Path) -> Router {
    let ui = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/api/health", get(handlers::liveness))
        .route("/api/molts", get(handlers::list_molts))
        .route("/api/molts/:name/status", get(handlers::molt_status))
        .route("/api/molts/:name/start", post(handlers::start_molt))
        .route("/api/molts/:name/stop", post(handlers::stop_molt))
        .route("/api/molts/:name/logs", get(handlers::molt_logs))
        .route("/api/molts/:name/dashboard", get(handlers::molt_dashboard))
        .route("/api/molts/:name/health", get(handlers::molt_health))
        .route("/api/molts/:name/history", get(handlers::molt_history))
        .route("/api/molts/:name/watch-state", get(handlers::molt_watch_state))
        .route("/api/molts/:name/health/setup", post(handlers::setup_health))
        .route("/api/broadcast", post(handlers::broadcast))
        .fallback_service(ui)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl+C.
pub async fn serve(config: DashboardConfig) -> Result<()> {
    let state = AppState::from_config(&config)?;
    if !config.static_dir.join("index.html").exists() {
        log::warn!(
            "No index.html in {}, the UI will not be served",
            config.static_dir.display()
        );
    }
    let app = create_app(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| AppError::io(format!("Failed to bind {}:{}: {e}", config.host, config.port)))?;
    let addr: SocketAddr = listener.local_addr()?;
    log::info!("molt-dashboard listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::other(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
