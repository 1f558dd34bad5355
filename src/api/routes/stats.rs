//! Listing statistics.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::freshness::FreshnessState;
use crate::models::format_timestamp;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Every upcoming event, regardless of the listing horizon.
    pub total_events: i64,
    /// Upcoming events per category; empty categories are left out.
    pub categories: BTreeMap<&'static str, i64>,
    pub sources: Vec<String>,
    pub freshness: FreshnessState,
    pub last_updated: String,
}

/// GET /api/stats
async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let freshness = state.gate.state();
    let response = state
        .with_store(move |store| {
            Ok(StatsResponse {
                total_events: store.count_upcoming()?,
                categories: store
                    .category_counts()?
                    .into_iter()
                    .map(|(category, count)| (category.as_str(), count))
                    .collect(),
                sources: store.upcoming_sources()?,
                freshness,
                last_updated: format_timestamp(&store.clock().now()),
            })
        })
        .await?;
    Ok(Json(response))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/stats", get(stats))
}
