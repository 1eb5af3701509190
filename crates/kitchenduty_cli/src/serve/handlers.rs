//! HTTP route handlers: calendar feed and health.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;

use super::state::AppState;
use super::{FEED_ERROR_BODY, ICS_CONTENT_TYPE};

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health(State(state): State<Arc<AppState>>) -> Response {
    match state.roster_size() {
        Ok(roster_size) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "version": kitchenduty_core::core_version(),
                "roster_size": roster_size,
            })),
        )
            .into_response(),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "error", "error": err.to_string() })),
        )
            .into_response(),
    }
}

/// GET /calendar.ics
pub(crate) async fn handle_calendar(State(state): State<Arc<AppState>>) -> Response {
    // Refresh may hit SQLite and the remote store; keep it off the async workers.
    let rendered = tokio::task::spawn_blocking(move || state.render_feed()).await;

    match rendered {
        Ok(Ok(ics)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, ICS_CONTENT_TYPE)],
            ics,
        )
            .into_response(),
        Ok(Err(err)) => {
            error!("event=feed_render module=cli status=error error={}", err);
            feed_error()
        }
        Err(err) => {
            error!("event=feed_render module=cli status=error error={}", err);
            feed_error()
        }
    }
}

fn feed_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, FEED_ERROR_BODY).into_response()
}
