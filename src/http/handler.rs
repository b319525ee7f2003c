//! HTTP handlers for the dashboard API

use super::AppState;
use crate::dashboard::{Dashboard, DashboardLayout};
use crate::filter::{Level, Selection};
use crate::predict::Prediction;
use crate::view::{MetricView, ViewState, ViewType};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced to HTTP clients
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Dashboard not found: {0}")]
    DashboardNotFound(String),

    #[error("View not found: {dashboard}/{view}")]
    ViewNotFound { dashboard: String, view: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::DashboardNotFound(_) | ApiError::ViewNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Filter state as sent by the page: comma-separated identifiers per level
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub project: Option<String>,
    pub meeting: Option<String>,
    pub speaker: Option<String>,
    pub view_type: Option<String>,
}

impl FilterQuery {
    pub fn selection(&self) -> Result<Selection, ApiError> {
        Ok(Selection {
            project: parse_ids(Level::Project, self.project.as_deref())?,
            meeting: parse_ids(Level::Meeting, self.meeting.as_deref())?,
            speaker: parse_ids(Level::Speaker, self.speaker.as_deref())?,
        })
    }

    pub fn view_type(&self) -> Result<Option<ViewType>, ApiError> {
        match self.view_type.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(ApiError::InvalidRequest),
        }
    }
}

fn parse_ids(level: Level, raw: Option<&str>) -> Result<BTreeSet<i64>, ApiError> {
    let Some(raw) = raw else {
        return Ok(BTreeSet::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| {
                ApiError::InvalidRequest(format!("invalid {} identifier '{}'", level, s))
            })
        })
        .collect()
}

fn dashboard<'a>(state: &'a AppState, slug: &str) -> Result<&'a Dashboard, ApiError> {
    state
        .dashboard(slug)
        .ok_or_else(|| ApiError::DashboardNotFound(slug.to_string()))
}

fn metric_view<'a>(state: &'a AppState, slug: &str, view: &str) -> Result<&'a MetricView, ApiError> {
    dashboard(state, slug)?
        .view(view)
        .ok_or_else(|| ApiError::ViewNotFound {
            dashboard: slug.to_string(),
            view: view.to_string(),
        })
}

/// Redirect `/` to the first dashboard
pub async fn index_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.dashboards().next() {
        Some(first) => Redirect::temporary(&first.prefix()).into_response(),
        None => ApiError::Server("no dashboards mounted".to_string()).into_response(),
    }
}

/// `/{dashboard}` → `/{dashboard}/` so relative API paths resolve
pub async fn trailing_slash_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Redirect, ApiError> {
    let dashboard = dashboard(&state, &slug)?;
    Ok(Redirect::permanent(&dashboard.prefix()))
}

/// Handler for system status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "records": state.records(),
        "dashboards": state.dashboards().map(|d| d.prefix()).collect::<Vec<_>>(),
    }))
}

/// Dashboard manifest
pub async fn layout_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<DashboardLayout>, ApiError> {
    let dashboard = dashboard(&state, &slug)?;
    Ok(Json(dashboard.layout(state.nav())))
}

/// Recompute options and chart for a filter change
pub async fn view_handler(
    State(state): State<Arc<AppState>>,
    Path((slug, view_id)): Path<(String, String)>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<ViewState>, ApiError> {
    let view = metric_view(&state, &slug, &view_id)?;
    let selection = query.selection()?;
    let view_type = query.view_type()?;
    debug!("View {}/{} selection {:?}", slug, view_id, selection);
    Ok(Json(view.state(&selection, view_type)))
}

/// Clear every filter of one view
pub async fn view_reset_handler(
    State(state): State<Arc<AppState>>,
    Path((slug, view_id)): Path<(String, String)>,
) -> Result<Json<ViewState>, ApiError> {
    let view = metric_view(&state, &slug, &view_id)?;
    Ok(Json(view.state(&view.reset(), None)))
}

/// Model estimate for the current filters
pub async fn prediction_handler(
    State(state): State<Arc<AppState>>,
    Path((slug, view_id)): Path<(String, String)>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Prediction>, ApiError> {
    let prediction = dashboard(&state, &slug)?
        .prediction(&view_id)
        .ok_or_else(|| ApiError::ViewNotFound {
            dashboard: slug.clone(),
            view: view_id.clone(),
        })?;
    let selection = query.selection()?;
    Ok(Json(prediction.predict(&selection)))
}
