/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require a
 * session, plus the extractors handlers use to read the credentials.
 *
 * The session is read from the `session` cookie, the `Session` header or
 * the `Authorization` header (in that order). The license is read from
 * the `license` cookie or the `License` header.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::auth::licenses::{verify_license, License};
use crate::backend::auth::sessions::verify_session;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Authenticated user data extracted from the session token
#[derive(Clone, Debug, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub token: String,
}

/// Authentication middleware
///
/// This middleware:
/// 1. Verifies the session credential
/// 2. Checks that the user still exists when a database is configured
/// 3. Attaches the user to request extensions for use in handlers
///
/// Returns 401 `sessionInvalid` if the session is missing or invalid.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let jar = CookieJar::from_headers(request.headers());
    let session = verify_session(&app_state.config, &jar, request.headers()).ok_or_else(|| {
        tracing::warn!("Missing or invalid session on {}", request.uri().path());
        BackendError::unauthorized("sessionInvalid")
    })?;

    // A deleted account keeps a valid token until it expires
    if let Some(pool) = &app_state.db_pool {
        if !user_exists(pool, session.user_id).await? {
            tracing::warn!("Session of deleted user {}", session.user_id);
            return Err(BackendError::unauthorized("sessionInvalid"));
        }
    }

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: session.user_id,
        token: session.token,
    });

    Ok(next.run(request).await)
}

async fn user_exists(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
    use crate::backend::auth::users::get_user_by_id;

    Ok(get_user_by_id(pool, user_id).await?.is_some())
}

/// Axum extractor for the session user
///
/// Reads the user set by [`auth_middleware`], or verifies the session
/// itself on routes without the middleware.
#[derive(Clone, Debug)]
pub struct AuthSession(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(AuthSession(user.clone()));
        }

        let jar = CookieJar::from_headers(&parts.headers);
        verify_session(&state.config, &jar, &parts.headers)
            .map(|session| {
                AuthSession(AuthenticatedUser {
                    user_id: session.user_id,
                    token: session.token,
                })
            })
            .ok_or_else(|| BackendError::unauthorized("sessionInvalid"))
    }
}

/// Axum extractor for the current license, signed or not
///
/// Handlers check the target and the signature themselves, since an
/// unsigned license is exactly what the OTP confirmation consumes.
#[derive(Clone, Debug)]
pub struct AuthLicense(pub License);

impl FromRequestParts<AppState> for AuthLicense {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        verify_license(&state.config, &jar, &parts.headers)
            .map(AuthLicense)
            .ok_or_else(|| {
                tracing::warn!("Missing or invalid license on {}", parts.uri.path());
                BackendError::unauthorized("licenseInvalid")
            })
    }
}
