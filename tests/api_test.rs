//! Integration tests for the HTTP endpoints.

mod common;

use axum::http::StatusCode;
use community_events::db;
use community_events::freshness::FreshnessState;

#[tokio::test]
async fn test_health_reports_unchecked_gate_before_first_listing() {
    let app = common::build_test_app(common::seeded_state(&[]));

    let (status, json) = common::get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["freshness"], "unchecked");
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = common::build_test_app(common::seeded_state(&[]));

    let (status, _) = common::get_text(app, "/api/nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_fresh_store_is_served_without_collecting() {
    let state = common::seeded_state(&common::sample_events());
    let app = common::build_test_app(state.clone());

    let (status, json) = common::get_json(app, "/api/events").await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "City Council Meeting",
            "Waltham Farmers' Market",
            "Brandeis Jazz Ensemble Concert"
        ]
    );
    assert_eq!(state.gate.state(), FreshnessState::Ready);

    // No pass ran, so the past row was not purged either.
    let total = db::lock(&state.store).unwrap().count_all().unwrap();
    assert_eq!(total, 4);
}

#[tokio::test]
async fn test_event_records_use_the_flat_wire_shape() {
    let app = common::build_test_app(common::seeded_state(&common::sample_events()));

    let (_, json) = common::get_json(app, "/api/events?search=market").await;

    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 1);
    let market = &records[0];
    assert_eq!(market["date_time"], "2025-06-07T08:00:00");
    assert_eq!(market["category"], "community");
    assert_eq!(market["cost"], "Free to attend");
    assert_eq!(market["registration_required"], false);
    assert_eq!(market["created_at"], "2025-06-02T08:00:00");
    assert!(market["id"].is_i64());
}

#[tokio::test]
async fn test_listing_filters_compose_and_limit_truncates() {
    let state = common::seeded_state(&common::sample_events());

    let (_, json) = common::get_json(
        common::build_test_app(state.clone()),
        "/api/events?category=community&source=City%20of%20Waltham",
    )
    .await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "City Council Meeting");

    let (_, json) = common::get_json(
        common::build_test_app(state.clone()),
        "/api/events?category=karaoke&limit=2",
    )
    .await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (_, json) = common::get_json(
        common::build_test_app(state),
        "/api/events?start_date=2025-06-07&end_date=2025-06-07",
    )
    .await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "Waltham Farmers' Market");
}

#[tokio::test]
async fn test_invalid_listing_parameters_return_400() {
    let state = common::seeded_state(&common::sample_events());

    let (status, json) =
        common::get_json(common::build_test_app(state.clone()), "/api/events?limit=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "bad_request");

    let (status, json) = common::get_json(
        common::build_test_app(state),
        "/api/events?start_date=next-week",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("start date"));
}

#[tokio::test]
async fn test_event_lookup_by_id() {
    let state = common::seeded_state(&common::sample_events());

    let (status, json) =
        common::get_json(common::build_test_app(state.clone()), "/api/events/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Waltham Farmers' Market");

    let (status, json) =
        common::get_json(common::build_test_app(state.clone()), "/api/events/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");

    let (status, _) = common::get_json(common::build_test_app(state), "/api/events/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_count_upcoming_events_per_category() {
    let app = common::build_test_app(common::seeded_state(&common::sample_events()));

    let (status, json) = common::get_json(app, "/api/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_events"], 3);
    assert_eq!(json["categories"]["community"], 2);
    assert_eq!(json["categories"]["music"], 1);
    assert!(json["categories"].get("general").is_none());
    assert_eq!(
        json["sources"],
        serde_json::json!(["Brandeis University", "City of Waltham", "Waltham Common"])
    );
    assert_eq!(json["last_updated"], "2025-06-02T08:00:00");
}

#[tokio::test]
async fn test_sources_lists_registered_collectors() {
    let app = common::build_test_app(common::seeded_state(&[]));

    let (status, json) = common::get_json(app, "/api/sources").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|source| source["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 9);
    assert!(ids.contains(&"brandeis".to_string()));
    assert!(ids.contains(&"waltham_food_events".to_string()));
}

#[tokio::test]
async fn test_stale_store_collects_on_first_listing() {
    let state = common::seeded_state(&[]);
    let app = common::build_test_app(state.clone());

    let (status, json) = common::get_json(app, "/api/events").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json.as_array().unwrap().len() > 50);
    assert_eq!(state.gate.state(), FreshnessState::Ready);
}

#[tokio::test]
async fn test_listing_serves_stale_data_while_a_refresh_is_running() {
    let state = common::seeded_state(&common::sample_events());
    let guard = state.gate.try_begin_refresh().unwrap();

    let (status, json) =
        common::get_json(common::build_test_app(state.clone()), "/api/events").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 3);
    assert_eq!(state.gate.state(), FreshnessState::Refreshing);
    drop(guard);
    assert_eq!(state.gate.state(), FreshnessState::Ready);
}

#[tokio::test]
async fn test_update_is_idempotent_while_refreshing() {
    let state = common::seeded_state(&common::sample_events());
    let guard = state.gate.try_begin_refresh().unwrap();

    let (status, json) = common::post_json(common::build_test_app(state.clone()), "/update").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "already_refreshing");

    drop(guard);
    let (status, json) = common::get_json(common::build_test_app(state), "/update").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["status"], "started");
}

#[tokio::test]
async fn test_update_for_a_single_source() {
    let state = common::seeded_state(&[]);

    let (status, json) =
        common::get_json(common::build_test_app(state.clone()), "/update?source=nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");

    let (status, json) =
        common::post_json(common::build_test_app(state.clone()), "/update?source=brandeis").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["status"], "started");

    let mut stored = 0;
    for _ in 0..250 {
        if state.gate.state() == FreshnessState::Ready {
            stored = db::lock(&state.store).unwrap().count_all().unwrap();
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(stored, 3);
}

#[tokio::test]
async fn test_uppercase_category_is_ignored_by_the_listing() {
    let app = common::build_test_app(common::seeded_state(&common::sample_events()));

    let (status, json) = common::get_json(app, "/api/events?category=MUSIC").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_index_page_renders_filtered_listing() {
    let state = common::seeded_state(&common::sample_events());

    let (status, html) =
        common::get_text(common::build_test_app(state.clone()), "/?search=jazz").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Brandeis Jazz Ensemble Concert"));
    assert!(!html.contains("City Council Meeting"));
    assert!(!html.contains("Waltham Farmers&#39; Market"));

    let (status, html) =
        common::get_text(common::build_test_app(state), "/?end_date=June").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Invalid end date format: June"));
    assert!(html.contains("Waltham Farmers&#39; Market"));
}
