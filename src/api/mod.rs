//! HTTP serving layer: the listing page plus JSON endpoints.

pub mod error;
pub mod routes;
pub mod state;

use axum::Router;

use state::AppState;

/// Full application router. Middleware such as tracing is layered on by the
/// binary so tests can drive the bare router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::index::router())
        .merge(routes::events::router())
        .merge(routes::stats::router())
        .merge(routes::sources::router())
        .merge(routes::refresh::router())
        .with_state(state)
}
