//! Database test fixtures
//!
//! Database tests are skipped unless `DATABASE_URL` points at a Postgres
//! instance the suite may truncate.

use sqlx::PgPool;

/// Connect and migrate, or `None` when no test database is configured
pub async fn test_pool() -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = PgPool::connect(&url).await.expect("connect to test database");
    run_migrations(&pool).await.expect("run migrations");
    cleanup_test_data(&pool).await.expect("clean test database");
    Some(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Remove all rows while keeping the schema
pub async fn cleanup_test_data(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("TRUNCATE TABLE messages, files, chat_members, chats, users CASCADE")
        .execute(pool)
        .await?;
    Ok(())
}
