use axum::routing::get;
use axum::{Json, Router};

use crate::api::state::AppState;
use crate::collectors::{self, CollectorInfo};

/// GET /api/sources
async fn list_sources() -> Json<Vec<CollectorInfo>> {
    Json(collectors::list_collectors())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/sources", get(list_sources))
}
