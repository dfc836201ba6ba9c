/**
 * Licensed Account Handlers
 *
 * Password reset, e-mail migration and account termination each need a
 * signed license for their own target. Toggling two-factor authentication
 * only needs a session.
 */

use axum::{extract::State, http::HeaderMap, response::Json};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use crate::backend::auth::handlers::types::{MigrateEmailRequest, ResetPasswordRequest, TwoFactorResponse};
use crate::backend::auth::licenses::{delete_license, License};
use crate::backend::auth::profile::invalidate;
use crate::backend::auth::sessions::delete_session;
use crate::backend::auth::users::{
    delete_user, email_taken, get_user_by_id, toggle_two_factor, update_email, update_password,
};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::{AuthLicense, AuthSession};
use crate::backend::server::state::AppState;
use crate::shared::{validation, FlowResponse, FormErrors, LicensedRoute};

fn require(license: &License, target: LicensedRoute) -> BackendResult<()> {
    if license.grants(target) {
        Ok(())
    } else {
        tracing::warn!(
            "License for {} (signed: {}) used on {}",
            license.target,
            license.signed,
            target
        );
        Err(BackendError::unauthorized("licenseInvalid"))
    }
}

/// Reset the password of the license holder
pub async fn reset_password(
    State(state): State<AppState>,
    AuthLicense(license): AuthLicense,
    Json(request): Json<ResetPasswordRequest>,
) -> BackendResult<Json<FlowResponse>> {
    require(&license, LicensedRoute::ResetPassword)?;

    if request.password != request.password_again {
        return Err(BackendError::field("passwordAgain", "passwordMismatch"));
    }
    let password = request.password.trim();
    let mut errors = FormErrors::new();
    errors.check("password", password, validation::password);
    errors.into_result()?;

    let pool = state.db()?;
    if get_user_by_id(pool, license.user_id).await?.is_none() {
        return Err(BackendError::unauthorized("licenseInvalid"));
    }

    let password_hash = bcrypt::hash(password, state.config.bcrypt_cost)?;
    update_password(pool, license.user_id, &password_hash).await?;
    tracing::info!("Password reset for {}", license.user_id);

    Ok(Json(FlowResponse::redirect("/account")))
}

/// Move the license holder to a new e-mail address
///
/// The address can change at most once per `durations.email_change`.
pub async fn migrate_email(
    State(state): State<AppState>,
    AuthLicense(license): AuthLicense,
    Json(request): Json<MigrateEmailRequest>,
) -> BackendResult<Json<FlowResponse>> {
    require(&license, LicensedRoute::MigrateEmail)?;

    if request.email != request.email_again {
        return Err(BackendError::field("emailAgain", "emailMismatch"));
    }
    let email = request.email.trim();
    let mut errors = FormErrors::new();
    errors.check("email", email, validation::email);
    errors.into_result()?;

    let pool = state.db()?;
    let user = get_user_by_id(pool, license.user_id).await?;
    let user = match user {
        Some(user) if !email_taken(pool, email).await? => user,
        _ => return Err(BackendError::field("email", "emailTaken")),
    };

    let since = Utc::now().signed_duration_since(user.last_email_change);
    if since.num_seconds() < state.config.durations.email_change as i64 {
        tracing::warn!("E-mail change too soon for {}", user.username);
        return Err(BackendError::field("email", "emailFrequent"));
    }

    update_email(pool, user.id, email).await?;
    invalidate(&state.cache, user.id).await;
    tracing::info!("E-mail migrated for {}", user.username);

    Ok(Json(FlowResponse::redirect("/account")))
}

/// Delete the license holder's account and both credentials
pub async fn terminate_account(
    State(state): State<AppState>,
    AuthLicense(license): AuthLicense,
    jar: CookieJar,
    headers: HeaderMap,
) -> BackendResult<(CookieJar, Json<FlowResponse>)> {
    require(&license, LicensedRoute::TerminateAccount)?;

    let pool = state.db()?;
    if !delete_user(pool, license.user_id).await? {
        return Err(BackendError::unauthorized("licenseInvalid"));
    }
    invalidate(&state.cache, license.user_id).await;

    let (jar, _) = delete_session(&state.config, jar, &headers);
    let (jar, _) = delete_license(&state.config, jar, &headers);
    tracing::info!("Account {} terminated", license.user_id);

    Ok((jar, Json(FlowResponse::redirect("/account"))))
}

/// Flip two-factor authentication for the session user
pub async fn toggle_2fa(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
) -> BackendResult<Json<TwoFactorResponse>> {
    let pool = state.db()?;
    let enabled = toggle_two_factor(pool, user.user_id)
        .await?
        .ok_or_else(|| BackendError::unauthorized("sessionInvalid"))?;
    invalidate(&state.cache, user.user_id).await;

    tracing::info!("Two-factor authentication for {}: {}", user.user_id, enabled);
    Ok(Json(TwoFactorResponse {
        two_factor_auth: enabled,
    }))
}
