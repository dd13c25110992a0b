//! Integration tests for creation, listing, and details.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_movie, create_series, get, post_json};

// ---------------------------------------------------------------------------
// Create → details round-trip
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_201_with_a_string_id() {
    let app = common::build_test_app();
    let created = create_movie(&app, "Akira").await;

    let id = created["id"].as_str().expect("id must be a string");
    assert!(!id.is_empty());
    assert_eq!(created["title"], "Akira");
    assert_eq!(created["type"], "movie");
    assert!(created["added_at"].is_string());
}

#[tokio::test]
async fn details_round_trips_the_created_record() {
    let app = common::build_test_app();
    let created = create_series(&app, "Monster").await;
    let id = created["id"].as_str().unwrap();

    let response = get(app.clone(), &format!("/getdetails?id={id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = body_json(response).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_rejects_malformed_stream_link_urls() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/addanime",
        serde_json::json!({
            "title": "Broken",
            "type": "movie",
            "movie_stream_links": [{"label": "720p", "url": "not a url"}]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["detail"].is_string());
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn movie_and_series_listings_filter_by_type() {
    let app = common::build_test_app();
    create_movie(&app, "Movie A").await;
    create_series(&app, "Series B").await;
    create_movie(&app, "Movie C").await;

    let movies = body_json(get(app.clone(), "/movies").await).await;
    let movies = movies.as_array().unwrap();
    assert_eq!(movies.len(), 2);
    assert!(movies.iter().all(|a| a["type"] == "movie"));

    let series = body_json(get(app.clone(), "/series").await).await;
    let series = series.as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0]["title"], "Series B");
}

#[tokio::test]
async fn latest_lists_everything_newest_first() {
    let app = common::build_test_app();
    create_movie(&app, "first").await;
    create_series(&app, "second").await;
    create_movie(&app, "third").await;

    let latest = body_json(get(app.clone(), "/latest").await).await;
    let titles: Vec<&str> = latest
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn skip_and_limit_are_applied() {
    let app = common::build_test_app();
    for i in 0..5 {
        create_movie(&app, &format!("m{i}")).await;
    }

    let window = body_json(get(app.clone(), "/movies?limit=2&skip=1").await).await;
    let titles: Vec<&str> = window
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["m3", "m2"]);
}

#[tokio::test]
async fn out_of_range_limit_is_clamped_not_rejected() {
    let app = common::build_test_app();
    create_movie(&app, "only").await;

    let response = get(app.clone(), "/movies?limit=100000&skip=-4").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Details errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_id_is_400_never_404() {
    let app = common::build_test_app();
    let response = get(app, "/getdetails?id=definitely-not-a-uuid").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["detail"], "Invalid id");
}

#[tokio::test]
async fn unknown_id_is_404() {
    let app = common::build_test_app();
    let response = get(
        app,
        "/getdetails?id=00000000-0000-7000-8000-000000000000",
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["detail"], "Anime not found");
}
