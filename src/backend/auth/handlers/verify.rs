/**
 * Verification Handlers
 *
 * Step-up verification by e-mail:
 *
 * 1. `POST /api/auth/verify/{target}` mails a one-time password and issues an
 *    unsigned license for the target
 * 2. `POST /api/auth/confirm` checks the password, signs the license and
 *    creates a session
 *
 * Login with two-factor authentication enters at step 2 through the same
 * `issue_otp` helper.
 */

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::backend::auth::handlers::types::{EmailRequest, OtpRequest, Trimmed};
use crate::backend::auth::licenses::{create_license, sign_license, License};
use crate::backend::auth::otp::{generate_otp, hash_otp, verify_otp};
use crate::backend::auth::sessions::create_session;
use crate::backend::auth::users::{get_user_by_email, get_user_by_id, set_otp, User};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::mail::verify_mail;
use crate::backend::middleware::AuthLicense;
use crate::backend::server::state::AppState;
use crate::shared::{validation, FlowResponse, FormErrors, LicensedRoute};

/// Mail a fresh OTP to `user`, store its hash and issue an unsigned license
pub async fn issue_otp(
    state: &AppState,
    jar: CookieJar,
    user: &User,
    route: LicensedRoute,
) -> BackendResult<(CookieJar, License)> {
    let pool = state.db()?;
    let otp = generate_otp(state.config.lengths.otp);
    let otp_hash = hash_otp(&otp, state.config.bcrypt_cost)?;

    set_otp(pool, user.id, Some(&otp_hash)).await?;
    state
        .mailer
        .send(&user.email, verify_mail(route, &user.name, &otp, &state.config))
        .await;

    create_license(&state.config, jar, route, user.id)
}

/// Start a licensed flow
///
/// Unknown targets redirect to `/login` without touching anything.
pub async fn verify(
    State(state): State<AppState>,
    Path(target): Path<String>,
    jar: CookieJar,
    Json(request): Json<EmailRequest>,
) -> BackendResult<(CookieJar, Json<FlowResponse>)> {
    let route = match target.parse::<LicensedRoute>() {
        Ok(route) => route,
        Err(()) => {
            tracing::warn!("Verification requested for unknown target: {}", target);
            return Ok((jar, Json(FlowResponse::redirect("/login"))));
        }
    };

    let pool = state.db()?;
    let request = request.trimmed();
    request.validate()?;

    let user = get_user_by_email(pool, &request.email)
        .await?
        .ok_or_else(|| BackendError::field("email", "emailNotFound"))?;

    let (jar, license) = issue_otp(&state, jar, &user, route).await?;
    tracing::info!("Verification code for {} sent to {}", route, user.username);

    Ok((jar, Json(FlowResponse::redirect("/confirm").with_license(license.token))))
}

/// Confirm the OTP of the current license
///
/// # Errors
///
/// * `401 licenseInvalid` - No license, or the user has no pending OTP
/// * `422 otpLength` / `422 otpInvalid` - Malformed or wrong password
pub async fn confirm(
    State(state): State<AppState>,
    AuthLicense(license): AuthLicense,
    jar: CookieJar,
    headers: HeaderMap,
    Json(request): Json<OtpRequest>,
) -> BackendResult<(CookieJar, Json<FlowResponse>)> {
    let pool = state.db()?;

    let otp = request.otp.trim();
    let mut errors = FormErrors::new();
    let len = state.config.lengths.otp;
    errors.check("otp", otp, |value| validation::otp(value, len));
    errors.into_result()?;

    let user = get_user_by_id(pool, license.user_id).await?;
    let Some((user, otp_hash)) = user.and_then(|u| u.otp.clone().map(|hash| (u, hash))) else {
        tracing::warn!("Confirmation without a pending code for {}", license.user_id);
        return Err(BackendError::unauthorized("licenseInvalid"));
    };

    if !verify_otp(otp, &otp_hash) {
        tracing::warn!("Wrong verification code for {}", user.username);
        return Err(BackendError::field("otp", "otpInvalid"));
    }

    let (jar, signed) = sign_license(&state.config, jar, &headers)?;
    let signed = signed
        .filter(|l| l.signed)
        .ok_or_else(|| BackendError::unauthorized("licenseInvalid"))?;

    // A code is good for one confirmation
    set_otp(pool, user.id, None).await?;

    let (jar, session) = create_session(&state.config, jar, user.id)?;
    tracing::info!("License {} signed for {}", signed.target, user.username);

    Ok((
        jar,
        Json(
            FlowResponse::redirect(signed.target.href())
                .with_session(session.token)
                .with_license(signed.token),
        ),
    ))
}
