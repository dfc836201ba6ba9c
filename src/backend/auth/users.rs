/**
 * User Model and Database Operations
 *
 * This module handles user rows: creation, lookups by each unique column,
 * and the single-column updates the account flows perform.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::shared::{Personalizable, Profile};

const USER_COLUMNS: &str = "id, name, email, username, phone, password, otp, two_factor_auth, \
     avatar_url, avatar_id, last_email_change, created_at, updated_at";

/// User struct representing a user in the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Unique, 3-30 chars of `[a-z0-9_]`
    pub username: String,
    pub phone: Option<String>,
    /// bcrypt hash; empty for accounts created through OAuth
    pub password: Option<String>,
    /// bcrypt hash of the pending one-time password
    pub otp: Option<String>,
    pub two_factor_auth: bool,
    pub avatar_url: Option<String>,
    pub avatar_id: Option<Uuid>,
    pub last_email_change: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user without secrets, as returned by `/api/auth/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub two_factor_auth: bool,
    pub last_email_change: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            phone: user.phone.clone(),
            avatar_url: user.avatar_url.clone(),
            two_factor_auth: user.two_factor_auth,
            last_email_change: user.last_email_change,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Fields of a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

pub async fn create_user(pool: &PgPool, new_user: NewUser) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, name, email, username, password, two_factor_auth,
                           last_email_change, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, FALSE, $6, $6, $6)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&new_user.name)
    .bind(&new_user.email)
    .bind(&new_user.username)
    .bind(&new_user.password_hash)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn get_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn get_users_by_usernames(pool: &PgPool, usernames: &[String]) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ANY($1)"))
        .bind(usernames)
        .fetch_all(pool)
        .await
}

/// Whether another row already holds `value` in a unique column
pub async fn is_taken(pool: &PgPool, field: Personalizable, value: &str) -> Result<bool, sqlx::Error> {
    let column = match field {
        Personalizable::Username => "username",
        Personalizable::Phone => "phone",
        Personalizable::Name => return Ok(false),
    };
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {column} = $1"))
        .bind(value)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn email_taken(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Store (or clear with `None`) the pending OTP hash
pub async fn set_otp(pool: &PgPool, id: Uuid, otp_hash: Option<&str>) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET otp = $1, updated_at = NOW() WHERE id = $2")
        .bind(otp_hash)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_password(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_email(pool: &PgPool, id: Uuid, email: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users SET email = $1, last_email_change = NOW(), updated_at = NOW() WHERE id = $2",
    )
    .bind(email)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Update one personalizable column and return the resulting profile
pub async fn update_field(
    pool: &PgPool,
    id: Uuid,
    field: Personalizable,
    value: &str,
) -> Result<User, sqlx::Error> {
    let column = field.field();
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET {column} = $1, updated_at = NOW() WHERE id = $2 RETURNING {USER_COLUMNS}"
    ))
    .bind(value)
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Flip two-factor authentication, returning the new state
pub async fn toggle_two_factor(pool: &PgPool, id: Uuid) -> Result<Option<bool>, sqlx::Error> {
    sqlx::query_scalar(
        "UPDATE users SET two_factor_auth = NOT two_factor_auth, updated_at = NOW() \
         WHERE id = $1 RETURNING two_factor_auth",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn set_avatar(pool: &PgPool, id: Uuid, file_id: Uuid, url: &str) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET avatar_id = $1, avatar_url = $2, updated_at = NOW() WHERE id = $3 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(file_id)
    .bind(url)
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Delete a user; memberships, messages and files cascade
pub async fn delete_user(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
