/**
 * Session Management
 *
 * A session is the long-lived login credential. It is issued as the
 * `session` cookie and returned in the flow response so non-browser
 * clients can send it as `Session: Bearer <token>` or
 * `Authorization: Bearer <token>`.
 */

use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::auth::tokens::{bearer, credential_cookie, decrypt, encrypt, now_secs, removal_cookie};
use crate::backend::error::BackendResult;
use crate::shared::AppConfig;

pub const COOKIE_NAME: &str = "session";
pub const HEADER_NAME: &str = "Session";

/// JWT claims of a session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: Uuid,
    pub iat: u64,
    pub exp: u64,
}

/// A verified session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: u64,
}

fn issue(config: &AppConfig, jar: CookieJar, user_id: Uuid) -> BackendResult<(CookieJar, Session)> {
    let iat = now_secs();
    let exp = iat + config.durations.session;
    let token = encrypt(&config.jwt_secret, &SessionClaims { sub: user_id, iat, exp })?;
    let jar = jar.add(credential_cookie(config, COOKIE_NAME, token.clone(), config.durations.session));

    Ok((
        jar,
        Session {
            token,
            user_id,
            expires_at: exp,
        },
    ))
}

/// Issue a session for `user_id` and set its cookie
pub fn create_session(config: &AppConfig, jar: CookieJar, user_id: Uuid) -> BackendResult<(CookieJar, Session)> {
    let issued = issue(config, jar, user_id)?;
    tracing::info!("Session created for user {}", user_id);
    Ok(issued)
}

/// Verify the session from the cookie, then the `Session` header, then `Authorization`
pub fn verify_session(config: &AppConfig, jar: &CookieJar, headers: &HeaderMap) -> Option<Session> {
    let token = jar
        .get(COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| bearer(headers, HEADER_NAME))
        .or_else(|| bearer(headers, AUTHORIZATION.as_str()))?;

    let claims: SessionClaims = decrypt(&config.jwt_secret, &token)?;
    Some(Session {
        token,
        user_id: claims.sub,
        expires_at: claims.exp,
    })
}

/// Re-issue the current session with a fresh expiry
pub fn update_session(
    config: &AppConfig,
    jar: CookieJar,
    headers: &HeaderMap,
) -> BackendResult<(CookieJar, Option<Session>)> {
    match verify_session(config, &jar, headers) {
        Some(current) => {
            let (jar, session) = issue(config, jar, current.user_id)?;
            Ok((jar, Some(session)))
        }
        None => Ok((jar, None)),
    }
}

/// Remove the session cookie, returning the session it held
pub fn delete_session(config: &AppConfig, jar: CookieJar, headers: &HeaderMap) -> (CookieJar, Option<Session>) {
    match verify_session(config, &jar, headers) {
        Some(session) => (jar.remove(removal_cookie(COOKIE_NAME)), Some(session)),
        None => (jar, None),
    }
}
