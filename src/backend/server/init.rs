/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including state creation, connection loading, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Connect the database (optional) and Redis (optional)
 * 2. Build the mailer and object store from configuration
 * 3. Create the router
 * 4. Start the realtime channel sweeper
 */

use std::time::Duration;

use axum::Router;

use crate::backend::cache::CacheService;
use crate::backend::error::BackendResult;
use crate::backend::mail::Mailer;
use crate::backend::ratelimit::RateLimiter;
use crate::backend::realtime::RealtimeHub;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, load_redis};
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Interval between sweeps of idle realtime channels and rate-limit windows
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Build the application state from configuration
///
/// Missing services degrade instead of failing: no database means 503 on
/// database-backed routes, no Redis means in-process cache and limiter, no
/// SMTP host means the memory outbox.
pub async fn build_state(config: AppConfig) -> BackendResult<AppState> {
    let db_pool = load_database(&config).await;
    let redis = load_redis(&config);
    let mailer = Mailer::from_config(&config.mail)?;

    let cache_ttl = Duration::from_secs(config.durations.cache);
    let prefix = config.name.to_lowercase();
    let (limit, window) = (config.lengths.rate_limit, config.durations.rate_limit);

    let mut state = AppState::new(config, db_pool)?.with_mailer(mailer);
    if let Some(store) = redis {
        let limiter = RateLimiter::redis(store.pool().clone(), limit, window);
        state = state
            .with_cache(CacheService::redis(store, prefix, cache_ttl))
            .with_limiter(limiter);
    }

    Ok(state)
}

/// Periodically drop realtime channels nobody listens to and expired
/// rate-limit windows
pub fn spawn_cleanup(hub: RealtimeHub, limiter: RateLimiter) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = hub.cleanup_inactive_channels();
            let expired = limiter.sweep_expired().await;
            tracing::debug!(
                "Cleaned up {} inactive realtime channels and {} rate-limit windows",
                removed,
                expired
            );
        }
    });
}

/// Create and configure the Axum application
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub async fn create_app(config: AppConfig) -> BackendResult<Router> {
    tracing::info!("Initializing {} backend server", config.name);

    let state = build_state(config).await?;
    spawn_cleanup(state.realtime.clone(), state.limiter.clone());

    let app = create_router(state);
    tracing::info!("Router configured with periodic cleanup task");

    Ok(app)
}
