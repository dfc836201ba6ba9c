/**
 * Server Configuration
 *
 * This module turns the loaded `AppConfig` into live connections: the
 * optional PostgreSQL pool and the optional Redis pool.
 *
 * # Error Handling
 *
 * Connection errors are logged but do not prevent server startup.
 * Services that fail to initialize are set to `None` and the server
 * continues without them.
 */

use sqlx::PgPool;

use crate::backend::cache::RedisCacheStore;
use crate::shared::AppConfig;

/// Database configuration result
///
/// Contains the database connection pool if successfully configured,
/// or `None` if the database is not available.
pub type DatabaseConfig = Option<PgPool>;

/// Connect to PostgreSQL and run migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is successfully configured
/// - `None` if no database URL is set or the connection fails
pub async fn load_database(config: &AppConfig) -> DatabaseConfig {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Database features will be disabled.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Database features will be disabled.");
            return None;
        }
    };

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}

/// Create the Redis pool when `REDIS_URL` is set
///
/// The pool connects lazily, so an unreachable server only shows up as
/// cache misses and unlimited requests at runtime.
pub fn load_redis(config: &AppConfig) -> Option<RedisCacheStore> {
    let redis_url = config.redis_url.as_deref()?;

    match RedisCacheStore::from_url(redis_url) {
        Ok(store) => {
            tracing::info!("Redis cache configured");
            Some(store)
        }
        Err(e) => {
            tracing::error!("Failed to configure Redis: {:?}", e);
            tracing::warn!("Falling back to in-process cache and rate limiter.");
            None
        }
    }
}
