use appointly_config::{AppConfig, AvailabilityConfig, GcalConfig};
use appointly_gcal::routes::{router, routes};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use fixtures::{create_state, timed_event, InMemoryCalendar};

async fn call(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_availability_in_zurich() {
    let calendar = Arc::new(InMemoryCalendar::with_events(vec![
        timed_event("standup", "2025-06-02T10:00:00+02:00", "2025-06-02T10:30:00+02:00"),
        timed_event("lunch", "2025-06-02T12:00:00+02:00", "2025-06-02T13:00:00+02:00"),
    ]));
    let app = router(create_state(calendar));

    let (status, body) = call(
        app,
        "/check_availability",
        json!({ "args": { "time_zone": "Europe/Zurich", "now": "2025-06-02T07:15:00+02:00" } }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let starts: Vec<&str> = body["availableSlots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start"].as_str().unwrap())
        .collect();
    assert_eq!(starts.len(), 18);
    assert_eq!(starts[0], "2025-06-02T09:00:00.000+02:00");
    assert_eq!(starts[1], "2025-06-02T11:00:00.000+02:00");
    assert!(!starts.contains(&"2025-06-02T12:00:00.000+02:00"));
    assert_eq!(starts[8], "2025-06-03T09:00:00.000+02:00");
}

#[tokio::test]
async fn test_availability_is_rendered_in_callers_zone() {
    // The same busy hour seen from two zones blocks the same instant.
    let calendar = Arc::new(InMemoryCalendar::with_events(vec![timed_event(
        "call",
        "2025-06-02T14:00:00Z",
        "2025-06-02T15:00:00Z",
    )]));
    let app = router(create_state(calendar));

    let (_, body) = call(
        app,
        "/check_availability",
        json!({ "args": { "time_zone": "America/New_York", "now": "2025-06-02T12:00:00Z" } }),
    )
    .await;

    let starts: Vec<&str> = body["availableSlots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start"].as_str().unwrap())
        .collect();
    assert_eq!(starts[0], "2025-06-02T09:00:00.000-04:00");
    assert!(!starts.contains(&"2025-06-02T10:00:00.000-04:00"));
    assert!(starts.contains(&"2025-06-02T11:00:00.000-04:00"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = router(create_state(Arc::new(InMemoryCalendar::default())));
    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_routes_fail_without_credentials_file() {
    let config = Arc::new(AppConfig {
        use_gcal: true,
        gcal: Some(GcalConfig {
            credentials_path: "/nonexistent/appointly/credentials.json".to_string(),
            ..GcalConfig::default()
        }),
        ..AppConfig::default()
    });

    let err = routes(config).await.err().expect("missing credentials must fail");
    assert!(err.to_string().contains("credentials"));
}

#[tokio::test]
async fn test_routes_reject_invalid_policy() {
    let config = Arc::new(AppConfig {
        availability: AvailabilityConfig {
            business_end: "seven pm".to_string(),
            ..AvailabilityConfig::default()
        },
        ..AppConfig::default()
    });

    let err = routes(config).await.err().expect("invalid policy must fail");
    assert!(err.to_string().contains("business_end"));
}
