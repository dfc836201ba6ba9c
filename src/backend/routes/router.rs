/**
 * Router Configuration
 *
 * Combines all route groups into one Axum router and wraps it in the
 * request layers: tracing, CORS for the main site and the per-IP rate
 * limit.
 *
 * # Layer Order
 *
 * Requests pass the trace layer first, then CORS, then the rate limiter,
 * then the per-group authentication `route_layer`.
 */

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::backend::middleware::rate_limit_middleware;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::chat_routes::configure_chat_routes;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// CORS for browser calls from the main site, with credentials
fn cors(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("session"),
            HeaderName::from_static("license"),
        ])
        .allow_credentials(true);

    match HeaderValue::from_str(config.urls.main.trim_end_matches('/')) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!("Invalid main URL for CORS, cross-origin calls disabled: {}", e);
            layer
        }
    }
}

/// Create the Axum router with all routes configured
///
/// 1. **Health**: `GET /health`
/// 2. **API Routes**: accounts, profiles, files
/// 3. **Chat Routes**: chats, messages, realtime
/// 4. **Fallback Handler**: 404 `notFound`
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/health", get(health));
    let router = configure_api_routes(router, &app_state);
    let router = configure_chat_routes(router, &app_state);

    router
        .fallback(|| async { crate::backend::error::BackendError::not_found("notFound") })
        .layer(middleware::from_fn_with_state(
            app_state.limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(cors(&app_state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
