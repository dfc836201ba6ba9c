//! Router fixtures and request helpers

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use nordaun::backend::mail::Mailer;
use nordaun::backend::routes::create_router;
use nordaun::backend::AppState;
use nordaun::shared::AppConfig;

pub const TEST_SECRET: &str = "integration-secret-that-is-long-enough";

/// Configuration for tests: fast bcrypt, small history pages, a limiter
/// that never gets in the way
pub fn test_config() -> AppConfig {
    AppConfig::builder()
        .jwt_secret(TEST_SECRET)
        .bcrypt_cost(4)
        .message_chunk(5)
        .rate_limit(10_000, 60)
        .build()
        .expect("test config is valid")
}

/// Application state with a memory outbox
pub fn test_state(pool: Option<PgPool>) -> AppState {
    test_state_with(test_config(), pool)
}

pub fn test_state_with(config: AppConfig, pool: Option<PgPool>) -> AppState {
    AppState::new(config, pool)
        .expect("test state")
        .with_mailer(Mailer::memory())
}

pub fn test_app(state: &AppState) -> Router {
    create_router(state.clone())
}

/// Send one request, returning the status and the JSON body (`Null` when empty)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    session: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = session {
        builder = builder.header("Session", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("valid request");

    let response = app.clone().oneshot(request).await.expect("router never fails");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Same as [`send`], with a license header instead of a session
pub async fn send_licensed(app: &Router, uri: &str, license: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("License", format!("Bearer {license}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request");

    let response = app.clone().oneshot(request).await.expect("router never fails");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// The one-time password of the latest mail sent to `to`
pub fn last_otp(mailer: &Mailer, to: &str) -> Option<String> {
    mailer
        .outbox()
        .into_iter()
        .rev()
        .find(|mail| mail.to == to)
        .and_then(|mail| mail.content.text.split("\n\n").nth(2).map(str::to_string))
}
