//! HTTP server for the dashboards

use super::handler::{
    index_handler, layout_handler, prediction_handler, status_handler, trailing_slash_handler,
    view_handler, view_reset_handler, ApiError,
};
use super::AppState;
use crate::config::ServerConfig;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use rust_embed::RustEmbed;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(RustEmbed)]
#[folder = "src/http/static/"]
struct Assets;

/// Every dashboard serves the same page; it discovers its views from `api/layout`
async fn static_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    if state.dashboard(&slug).is_none() {
        return ApiError::DashboardNotFound(slug).into_response();
    }
    match Assets::get("index.html") {
        Some(page) => Html(String::from_utf8_lossy(page.data.as_ref()).into_owned()).into_response(),
        None => ApiError::Server("dashboard page missing from build".to_string()).into_response(),
    }
}

/// Routes for every mounted dashboard
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/status", get(status_handler))
        .route("/:dashboard", get(trailing_slash_handler))
        .route("/:dashboard/", get(static_handler))
        .route("/:dashboard/api/layout", get(layout_handler))
        .route("/:dashboard/api/views/:view", get(view_handler))
        .route("/:dashboard/api/views/:view/reset", get(view_reset_handler))
        .route("/:dashboard/api/predictions/:view", get(prediction_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP server hosting all dashboards in one process
pub struct HttpServer {
    state: Arc<AppState>,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(state: Arc<AppState>, config: ServerConfig) -> Self {
        Self { state, config }
    }

    /// Bind and serve until the process is stopped
    pub async fn start(&self) -> std::io::Result<()> {
        let app = build_router(Arc::clone(&self.state));

        let addr = format!("{}:{}", self.config.address, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        for dashboard in self.state.dashboards() {
            info!(
                "{} available at http://localhost:{}{}",
                dashboard.title(),
                self.config.port,
                dashboard.prefix()
            );
        }

        axum::serve(listener, app).await
    }
}
