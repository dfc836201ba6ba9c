//! Database migration tests
//!
//! The schema must carry every table and the cascades the handlers rely on.

use serial_test::serial;

use crate::common::{create_test_user, run_migrations, test_config, test_pool};

#[tokio::test]
#[serial]
async fn test_migrations_are_idempotent() {
    let Some(pool) = test_pool().await else { return };
    assert!(run_migrations(&pool).await.is_ok());
}

#[tokio::test]
#[serial]
async fn test_tables_exist() {
    let Some(pool) = test_pool().await else { return };
    for table in ["users", "chats", "chat_members", "messages", "files"] {
        let result = sqlx::query(&format!("SELECT 1 FROM {table} LIMIT 1")).execute(&pool).await;
        assert!(result.is_ok(), "table {table} should exist");
    }
}

#[tokio::test]
#[serial]
async fn test_usernames_are_unique() {
    let Some(pool) = test_pool().await else { return };
    let config = test_config();
    let user = create_test_user(&pool, &config, "solo").await;

    let duplicate = sqlx::query(
        "INSERT INTO users (id, name, email, username, two_factor_auth) VALUES ($1, 'Other User', 'other@example.com', $2, FALSE)",
    )
    .bind(uuid::Uuid::new_v4())
    .bind(&user.username)
    .execute(&pool)
    .await;
    assert!(duplicate.is_err());
}
