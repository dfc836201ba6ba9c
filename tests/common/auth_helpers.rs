//! Authentication test helpers

use axum_extra::extract::CookieJar;
use sqlx::PgPool;
use uuid::Uuid;

use nordaun::backend::auth::sessions::create_session;
use nordaun::backend::auth::users::{create_user, NewUser};
use nordaun::shared::AppConfig;

pub const TEST_PASSWORD: &str = "Password123!";

/// Test user credentials
pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    pub session: String,
}

/// Create a user with [`TEST_PASSWORD`] and a fresh session
pub async fn create_test_user(pool: &PgPool, config: &AppConfig, username: &str) -> TestUser {
    let password_hash = bcrypt::hash(TEST_PASSWORD, 4).expect("hash password");
    let user = create_user(
        pool,
        NewUser {
            name: "Test User".to_string(),
            email: format!("{username}@example.com"),
            username: username.to_string(),
            password_hash,
        },
    )
    .await
    .expect("create user");

    TestUser {
        session: session_token(config, user.id),
        id: user.id,
        name: user.name,
        email: user.email,
        username: user.username,
    }
}

pub fn session_token(config: &AppConfig, user_id: Uuid) -> String {
    let (_, session) = create_session(config, CookieJar::new(), user_id).expect("create session");
    session.token
}
