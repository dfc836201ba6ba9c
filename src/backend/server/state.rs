/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - The loaded configuration
 * - The optional database pool
 * - Cache, rate limiter and realtime hub handles
 * - Mailer, object store and the outgoing HTTP client
 *
 * Every field is a cheap, cloneable handle; cloning the state never copies
 * the data behind it.
 *
 * # Example
 *
 * ```rust,no_run
 * use nordaun::backend::server::state::AppState;
 * use axum::extract::State;
 *
 * async fn handler(State(state): State<AppState>) {
 *     let chunk = state.config.lengths.message_chunk;
 *     // ...
 * }
 * ```
 */

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::cache::CacheService;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::mail::Mailer;
use crate::backend::ratelimit::RateLimiter;
use crate::backend::realtime::RealtimeHub;
use crate::backend::storage::ObjectStore;
use crate::shared::AppConfig;

/// Application state shared by every handler
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,

    /// Database connection pool
    ///
    /// This is `None` if the database is not configured. Handlers go
    /// through [`AppState::db`], which answers 503 in that case.
    pub db_pool: Option<PgPool>,

    pub cache: CacheService,
    pub limiter: RateLimiter,
    pub realtime: RealtimeHub,
    pub mailer: Mailer,
    pub storage: ObjectStore,

    /// Client for outgoing calls (OAuth, object store)
    pub http: reqwest::Client,
}

impl AppState {
    /// State with in-process cache, limiter and mail outbox
    pub fn new(config: AppConfig, db_pool: Option<PgPool>) -> BackendResult<Self> {
        let http = reqwest::Client::new();
        let storage = ObjectStore::from_config(&config, http.clone())?;
        let cache = CacheService::memory(
            config.name.to_lowercase(),
            Duration::from_secs(config.durations.cache),
        );
        let limiter = RateLimiter::memory(config.lengths.rate_limit, config.durations.rate_limit);

        Ok(Self {
            config: Arc::new(config),
            db_pool,
            cache,
            limiter,
            realtime: RealtimeHub::new(),
            mailer: Mailer::memory(),
            storage,
            http,
        })
    }

    pub fn with_cache(mut self, cache: CacheService) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_mailer(mut self, mailer: Mailer) -> Self {
        self.mailer = mailer;
        self
    }

    /// The database pool, or 503 when none is configured
    pub fn db(&self) -> BackendResult<&PgPool> {
        self.db_pool.as_ref().ok_or_else(BackendError::unavailable)
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}

/// Implement FromRef for Option<PgPool>
///
/// This allows Axum handlers to extract the optional database pool
/// directly from `AppState`.
impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for CacheService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.cache.clone()
    }
}

impl FromRef<AppState> for RateLimiter {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.limiter.clone()
    }
}

impl FromRef<AppState> for RealtimeHub {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.realtime.clone()
    }
}

impl FromRef<AppState> for Mailer {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.mailer.clone()
    }
}
