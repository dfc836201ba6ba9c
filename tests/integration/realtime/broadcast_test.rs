//! Realtime SSE integration tests

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use nordaun::shared::{EventType, RealtimeEvent};

use crate::common::{send, session_token, test_app, test_state};

fn subscribe(channel: &str, token: &str) -> Request<Body> {
    Request::get(format!("/api/realtime/{channel}"))
        .header("Session", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("valid request")
}

#[tokio::test]
async fn test_own_channel_streams_published_events() {
    let state = test_state(None);
    let user_id = Uuid::new_v4();
    let token = session_token(&state.config, user_id);
    let channel = user_id.to_string();

    let response = test_app(&state)
        .oneshot(subscribe(&channel, &token))
        .await
        .expect("router never fails");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("text/event-stream")
    );
    assert_eq!(state.realtime.subscriber_count(&channel), 1);

    let delivered = state
        .realtime
        .publish(channel.clone(), EventType::AvatarUpdate, &json!({ "url": "https://cdn.example/a.png" }));
    assert_eq!(delivered, 1);

    let mut body = response.into_body().into_data_stream();
    let frame = tokio::time::timeout(Duration::from_secs(2), body.next())
        .await
        .expect("event within timeout")
        .expect("stream open")
        .expect("readable frame");
    let frame = String::from_utf8(frame.to_vec()).expect("utf-8 frame");

    assert!(frame.starts_with("event: avatar-update\n"), "{frame}");
    let data = frame
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .expect("data line");
    let event: RealtimeEvent = serde_json::from_str(data).expect("event json");
    assert_eq!(event.channel, channel);
    assert_eq!(event.event_type, EventType::AvatarUpdate);
    assert_eq!(event.payload["url"], "https://cdn.example/a.png");
}

#[tokio::test]
async fn test_foreign_channels_are_refused() {
    let state = test_state(None);
    let token = session_token(&state.config, Uuid::new_v4());
    let app = test_app(&state);

    let response = app
        .clone()
        .oneshot(subscribe("not-a-channel", &token))
        .await
        .expect("router never fails");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Another uuid needs a membership lookup, which needs the database
    let (status, body) = send(
        &app,
        axum::http::Method::GET,
        &format!("/api/realtime/{}", Uuid::new_v4()),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "serviceUnavailable");
}

#[tokio::test]
async fn test_subscription_needs_session() {
    let state = test_state(None);
    let (status, _) = send(
        &test_app(&state),
        axum::http::Method::GET,
        &format!("/api/realtime/{}", Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
