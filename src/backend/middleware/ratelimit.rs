/**
 * Rate Limit Middleware
 *
 * Counts every request against the client's IP and answers 429 once the
 * window is exhausted. Limiter failures let the request through.
 */

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};

use crate::backend::ratelimit::{RateLimitResult, RateLimiter};

/// Resolve the client IP from proxy headers or the socket
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let ip = forwarded
        .or(real_ip)
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string());

    if ip == "::1" {
        "127.0.0.1".to_string()
    } else {
        ip
    }
}

fn set_header(headers: &mut HeaderMap, name: &'static str, value: impl ToString) {
    if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
        headers.insert(HeaderName::from_static(name), value);
    }
}

fn set_limit_headers(headers: &mut HeaderMap, result: &RateLimitResult) {
    set_header(headers, "x-ratelimit-limit", result.limit);
    set_header(headers, "x-ratelimit-remaining", result.remaining);
    set_header(headers, "x-ratelimit-reset", &result.reset);
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer);

    let result = match limiter.check(&ip).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(?e, "Rate limiter unavailable; allowing request");
            return next.run(request).await;
        }
    };

    if !result.allowed {
        tracing::warn!(ip = %ip, "Rate limit exceeded");
        let body = serde_json::json!({
            "error": "Too many concurrent requests. Try again later...",
            "retryAfter": result.ttl,
        });
        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        set_header(response.headers_mut(), "retry-after", result.ttl);
        set_limit_headers(response.headers_mut(), &result);
        return response;
    }

    let mut response = next.run(request).await;
    set_limit_headers(response.headers_mut(), &result);
    response
}
