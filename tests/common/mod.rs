//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use http_body_util::BodyExt;
use tower::ServiceExt;

use community_events::api;
use community_events::api::state::AppState;
use community_events::clock::FixedClock;
use community_events::config::AppConfig;
use community_events::db::Store;
use community_events::models::{Category, Event};

/// Fixed "now" used across integration tests: a Monday morning.
pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 2)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(fixed_now()))
}

/// A small hand-written listing: three upcoming events, one past event.
pub fn sample_events() -> Vec<Event> {
    let now = fixed_now();
    vec![
        Event::new(
            "Waltham Farmers' Market",
            Some(now + Duration::days(5)),
            "https://www.city.waltham.ma.us/calendar#farmers-market-2025-06-07",
            "Waltham Common",
        )
        .with_location("Waltham Common")
        .with_category(Category::Community)
        .with_cost("Free to attend"),
        Event::new(
            "City Council Meeting",
            Some(now + Duration::days(1) + Duration::hours(11)),
            "https://www.city.waltham.ma.us/calendar#council-2025-06-03",
            "City of Waltham",
        )
        .with_location("Waltham City Hall, 610 Main St")
        .with_category(Category::Community),
        Event::new(
            "Brandeis Jazz Ensemble Concert",
            Some(now + Duration::days(20)),
            "https://www.brandeis.edu/events/#event_2",
            "Brandeis University",
        )
        .with_category(Category::Music),
        Event::new(
            "Last Week's Repair Cafe",
            Some(now - Duration::days(7)),
            "https://www.charlesrivermuseum.org/events#event_0",
            "Charles River Museum",
        ),
    ]
}

/// App state over an in-memory store holding `events`.
pub fn seeded_state(events: &[Event]) -> AppState {
    let store = Store::open_in_memory(fixed_clock()).unwrap();
    for event in events {
        store.insert(event).unwrap();
    }
    AppState::new(store, &AppConfig::default())
}

pub fn build_test_app(state: AppState) -> Router {
    api::router(state)
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, body_bytes.to_vec())
}

/// Send a GET request and decode the JSON response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = send(app, "GET", uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

/// Send a POST request without a body and decode the JSON response.
pub async fn post_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = send(app, "POST", uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

/// Send a GET request and return the body as text.
pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let (status, body) = send(app, "GET", uri).await;
    (status, String::from_utf8(body).unwrap())
}
