//! JSON event listing and point lookup.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::filter::{EventFilter, FilterParams};
use crate::models::Event;

type Record = Map<String, Value>;

/// Kept apart from [`FilterParams`] so the filter stays reusable by the HTML page.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pub limit: Option<String>,
}

/// Empty or zero means no limit.
fn parse_limit(raw: Option<&str>) -> Result<Option<usize>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    let limit: usize = raw
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("limit must be a non-negative integer, got {raw:?}")))?;
    Ok((limit > 0).then_some(limit))
}

/// GET /api/events
async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
    Query(listing): Query<ListingParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let (filter, warnings) = EventFilter::from_params(&params);
    if let Some(warning) = warnings.into_iter().next() {
        return Err(ApiError::BadRequest(warning));
    }
    let limit = parse_limit(listing.limit.as_deref())?;

    state.ensure_fresh().await;
    let query = state.listing_query();
    let events = state
        .with_store(move |store| store.query_upcoming(&query))
        .await?;

    let mut events = filter.apply(events);
    if let Some(limit) = limit {
        events.truncate(limit);
    }
    Ok(Json(events.iter().map(Event::to_record).collect()))
}

/// GET /api/events/{id}
async fn get_event(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let id: i64 = raw_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid event id {raw_id:?}")))?;
    let event = state
        .with_store(move |store| store.get_by_id(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;
    Ok(Json(event.to_record()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/events/{id}", get(get_event))
}
