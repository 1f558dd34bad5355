//! Manual refresh trigger.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::collectors;

#[derive(Debug, Default, Deserialize)]
pub struct RefreshParams {
    /// Restricts the pass to one registered collector.
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// GET|POST /update[?source=<id>]
///
/// Fire-and-forget: the pass runs on the blocking pool and the response goes
/// out immediately. While a pass is in flight further triggers are no-ops.
async fn trigger_refresh(
    State(state): State<AppState>,
    Query(params): Query<RefreshParams>,
) -> Result<(StatusCode, Json<RefreshResponse>), ApiError> {
    let source = params
        .source
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    if let Some(id) = &source {
        if !collectors::list_collectors().iter().any(|info| &info.id == id) {
            return Err(ApiError::NotFound(format!("unknown source {id:?}")));
        }
    }

    let Some(guard) = state.gate.try_begin_refresh() else {
        return Ok((
            StatusCode::OK,
            Json(RefreshResponse {
                status: "already_refreshing",
                message: "An event update is already running.",
            }),
        ));
    };

    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || {
        match source {
            Some(id) => match collectors::run_single(&store, &id) {
                Ok(report) => info!(
                    source = %id,
                    discovered = report.discovered,
                    inserted = report.inserted,
                    updated = report.updated,
                    "manual source refresh complete"
                ),
                Err(err) => error!(source = %id, "manual source refresh failed: {err}"),
            },
            None => match collectors::run_all(&store) {
                Ok(report) => info!(
                    discovered = report.discovered(),
                    inserted = report.inserted(),
                    updated = report.updated(),
                    purged = report.purged,
                    "manual refresh complete"
                ),
                Err(err) => error!("manual refresh failed: {err}"),
            },
        }
        guard.finish();
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            status: "started",
            message: "Event update started. Reload the listing in a moment to see new events.",
        }),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/update", get(trigger_refresh).post(trigger_refresh))
}
