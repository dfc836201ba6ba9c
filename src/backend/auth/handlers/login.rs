/**
 * Login and Logout Handlers
 *
 * # Authentication Process
 *
 * 1. Look up the user by email
 * 2. Verify the password using bcrypt
 * 3. Without 2FA: create a session and redirect to `/account`
 * 4. With 2FA: mail an OTP, issue an unsigned `twofactorauth` license and
 *    redirect to `/confirm`
 *
 * # Security
 *
 * - An unknown email and a wrong password fail the same way (`passwordInvalid`)
 * - Password verification uses bcrypt
 * - Passwords are never logged or returned in responses
 */

use axum::{extract::State, http::HeaderMap, response::Json};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::backend::auth::handlers::types::{LoginRequest, Trimmed};
use crate::backend::auth::handlers::verify::issue_otp;
use crate::backend::auth::licenses::delete_license;
use crate::backend::auth::sessions::{create_session, delete_session};
use crate::backend::auth::users::get_user_by_email;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::server::state::AppState;
use crate::shared::{FlowResponse, LicensedRoute};

/// Login handler
///
/// # Errors
///
/// * `422` - Invalid fields or `passwordInvalid`
/// * `503` - The database is not configured
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> BackendResult<(CookieJar, Json<FlowResponse>)> {
    let pool = state.db()?;
    let request = request.trimmed();
    request.validate()?;

    let user = get_user_by_email(pool, &request.email).await?;
    let Some((user, hash)) = user.and_then(|u| u.password.clone().map(|hash| (u, hash))) else {
        tracing::warn!("Login for unknown email or password-less account");
        return Err(BackendError::field("password", "passwordInvalid"));
    };

    if !bcrypt::verify(&request.password, &hash)? {
        tracing::warn!("Invalid password for user: {}", user.username);
        return Err(BackendError::field("password", "passwordInvalid"));
    }

    if user.two_factor_auth {
        let (jar, license) = issue_otp(&state, jar, &user, LicensedRoute::TwoFactorAuth).await?;
        tracing::info!("Two-factor code sent to {}", user.username);
        return Ok((jar, Json(FlowResponse::redirect("/confirm").with_license(license.token))));
    }

    let (jar, session) = create_session(&state.config, jar, user.id)?;
    tracing::info!("User logged in successfully: {}", user.username);

    Ok((jar, Json(FlowResponse::redirect("/account").with_session(session.token))))
}

/// Logout handler: removes the session and license cookies
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> (CookieJar, Json<FlowResponse>) {
    let (jar, session) = delete_session(&state.config, jar, &headers);
    let (jar, _) = delete_license(&state.config, jar, &headers);

    if let Some(session) = session {
        tracing::info!("User {} logged out", session.user_id);
    }

    (jar, Json(FlowResponse::redirect("/login")))
}
