/**
 * Signup Handler
 *
 * This module implements the user registration handler for POST /api/auth/signup.
 *
 * # Registration Process
 *
 * 1. Trim and validate name, email, username and password
 * 2. Check that the email and the username are free
 * 3. Hash the password using bcrypt
 * 4. Create the user and a session
 * 5. Redirect to `/account`
 */

use axum::{extract::State, response::Json};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::backend::auth::handlers::types::{SignupRequest, Trimmed};
use crate::backend::auth::sessions::create_session;
use crate::backend::auth::users::{create_user, email_taken, is_taken, NewUser};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::server::state::AppState;
use crate::shared::{FlowResponse, Personalizable};

/// Sign up handler
///
/// # Errors
///
/// * `422` - A field failed its rule, `emailTaken` or `usernameTaken`
/// * `503` - The database is not configured
///
/// # Example Request
///
/// ```http
/// POST /api/auth/signup HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "name": "Anna Kovacs",
///   "email": "anna@example.com",
///   "username": "anna",
///   "password": "correct horse 1"
/// }
/// ```
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<SignupRequest>,
) -> BackendResult<(CookieJar, Json<FlowResponse>)> {
    let pool = state.db()?;
    let request = request.trimmed();
    tracing::info!("Signup request for username: {}", request.username);

    request.validate()?;

    if email_taken(pool, &request.email).await? {
        tracing::warn!("Email already exists: {}", request.email);
        return Err(BackendError::field("email", "emailTaken"));
    }
    if is_taken(pool, Personalizable::Username, &request.username).await? {
        tracing::warn!("Username already exists: {}", request.username);
        return Err(BackendError::field("username", "usernameTaken"));
    }

    let password_hash = bcrypt::hash(&request.password, state.config.bcrypt_cost)?;

    let user = create_user(
        pool,
        NewUser {
            name: request.name,
            email: request.email,
            username: request.username,
            password_hash,
        },
    )
    .await?;

    let (jar, session) = create_session(&state.config, jar, user.id)?;
    tracing::info!("User created successfully: {}", user.username);

    Ok((jar, Json(FlowResponse::redirect("/account").with_session(session.token))))
}
