// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, get_request, json_request, seed_user};

async fn expect_bad_request(uri: &str, body: serde_json::Value, needle: &str) {
    let (app, state, _) = create_test_app();
    let token = seed_user(&state, "u1", "Ada").await;

    let response = app
        .oneshot(json_request("POST", uri, &token, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "bad_request");
    let details = body["details"].as_str().unwrap_or_default();
    assert!(
        details.contains(needle),
        "expected '{needle}' in '{details}'"
    );

    // Nothing was awarded for a rejected request.
    let user = state.db.get_user("u1").await.unwrap().unwrap();
    assert_eq!(user.engagement.total_points, 0);
}

#[tokio::test]
async fn test_mood_missing_fields() {
    expect_bad_request("/api/mood", json!({}), "Please provide mood and intensity").await;
}

#[tokio::test]
async fn test_mood_intensity_out_of_range() {
    expect_bad_request(
        "/api/mood",
        json!({"mood": {"emoji": "😊", "label": "Happy"}, "intensity": 11}),
        "Intensity must be between 1 and 10",
    )
    .await;
}

#[tokio::test]
async fn test_mood_journal_too_long() {
    expect_bad_request(
        "/api/mood",
        json!({
            "mood": {"emoji": "😊", "label": "Happy"},
            "intensity": 7,
            "journalEntry": "x".repeat(1001)
        }),
        "Journal entry must be 1000 characters or fewer",
    )
    .await;
}

#[tokio::test]
async fn test_breathing_unknown_technique() {
    expect_bad_request(
        "/api/breathing/session",
        json!({"technique": "wim-hof", "cycles": 3}),
        "Technique must be one of",
    )
    .await;
}

#[tokio::test]
async fn test_breathing_zero_cycles() {
    expect_bad_request(
        "/api/breathing/session",
        json!({"technique": "box", "cycles": 0, "duration": 60}),
        "Cycles must be between 1 and 10000",
    )
    .await;
}

#[tokio::test]
async fn test_breathing_duration_beyond_a_day() {
    expect_bad_request(
        "/api/breathing/session",
        json!({"technique": "box", "cycles": 4, "duration": 5_000_000_000i64}),
        "Duration must be between 0 and 86400 seconds",
    )
    .await;
}

#[tokio::test]
async fn test_post_whitespace_only() {
    expect_bad_request(
        "/api/community",
        json!({"content": "   \n\t "}),
        "Post content is required",
    )
    .await;
}

#[tokio::test]
async fn test_post_too_long() {
    expect_bad_request(
        "/api/community",
        json!({"content": "y".repeat(501)}),
        "500 characters",
    )
    .await;
}

#[tokio::test]
async fn test_post_too_many_tags() {
    let tags: Vec<String> = (0..11).map(|i| format!("tag{i}")).collect();
    expect_bad_request(
        "/api/community",
        json!({"content": "hello", "tags": tags}),
        "at most 10 tags",
    )
    .await;
}

#[tokio::test]
async fn test_calendar_invalid_month() {
    let (app, state, _) = create_test_app();
    let token = seed_user(&state, "u1", "Ada").await;

    let response = app
        .oneshot(get_request("/api/mood/calendar?year=2024&month=13", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_like_unknown_post_is_not_found() {
    let (app, state, _) = create_test_app();
    let token = seed_user(&state, "u1", "Ada").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/community/does-not-exist/like",
            &token,
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
