/**
 * Google OAuth Handlers
 *
 * `GET /api/auth/google/start` sends the browser to Google's consent page.
 * Google calls back `GET /api/auth/google?code=...`; the code is exchanged
 * for an access token, the account e-mail is read from the userinfo
 * endpoint and the existing user with that e-mail is signed in.
 *
 * The callback always lands on `/account`. Every failure is logged and
 * leaves the browser without a session.
 */

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::backend::auth::handlers::types::GoogleCallbackQuery;
use crate::backend::auth::sessions::create_session;
use crate::backend::auth::users::get_user_by_email;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    #[serde(default = "bearer_type")]
    token_type: String,
}

fn bearer_type() -> String {
    "Bearer".to_string()
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    email: Option<String>,
}

/// Consent page URL for the configured client
pub fn consent_url(config: &AppConfig) -> BackendResult<String> {
    if config.google.client_id.is_empty() {
        return Err(BackendError::unavailable());
    }
    let redirect_uri = config.google_redirect_uri();
    let url = reqwest::Url::parse_with_params(
        &config.google.auth_url,
        [
            ("client_id", config.google.client_id.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", "email profile"),
        ],
    )
    .map_err(|e| BackendError::state(format!("Invalid Google auth URL: {}", e)))?;

    Ok(url.into())
}

/// Exchange an authorization code for the e-mail of the Google account
pub async fn google_email(http: &reqwest::Client, config: &AppConfig, code: &str) -> anyhow::Result<Option<String>> {
    let redirect_uri = config.google_redirect_uri();
    let token: GoogleTokenResponse = http
        .post(&config.google.token_url)
        .form(&[
            ("code", code),
            ("client_id", config.google.client_id.as_str()),
            ("client_secret", config.google.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if token.access_token.is_empty() {
        return Ok(None);
    }

    let info: GoogleUserInfo = http
        .get(&config.google.userinfo_url)
        .header(
            reqwest::header::AUTHORIZATION,
            format!("{} {}", token.token_type, token.access_token),
        )
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(info.email.filter(|email| !email.is_empty()))
}

/// Redirect to Google's consent page
pub async fn google_start(State(state): State<AppState>) -> BackendResult<Redirect> {
    Ok(Redirect::to(&consent_url(&state.config)?))
}

/// OAuth callback
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<GoogleCallbackQuery>,
) -> (CookieJar, Redirect) {
    let redirect = Redirect::to("/account");

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        tracing::warn!("Google callback without a code");
        return (jar, redirect);
    };
    if state.config.google.client_id.is_empty() || state.config.google.client_secret.is_empty() {
        tracing::warn!("Google callback while OAuth is not configured");
        return (jar, redirect);
    }

    let email = match google_email(&state.http, &state.config, &code).await {
        Ok(Some(email)) => email,
        Ok(None) => {
            tracing::warn!("Google account without an e-mail address");
            return (jar, redirect);
        }
        Err(e) => {
            tracing::error!("Google token exchange failed: {:?}", e);
            return (jar, redirect);
        }
    };

    let Ok(pool) = state.db() else {
        return (jar, redirect);
    };
    let user = match get_user_by_email(pool, &email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!("No account for Google e-mail {}", email);
            return (jar, redirect);
        }
        Err(e) => {
            tracing::error!("Database error during Google login: {:?}", e);
            return (jar, redirect);
        }
    };

    match create_session(&state.config, jar.clone(), user.id) {
        Ok((jar, _)) => {
            tracing::info!("User {} logged in with Google", user.username);
            (jar, redirect)
        }
        Err(e) => {
            tracing::error!("Failed to create session: {:?}", e);
            (jar, redirect)
        }
    }
}
