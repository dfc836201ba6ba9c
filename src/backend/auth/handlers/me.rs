/**
 * Current User Handlers
 *
 * Session-backed reads and updates of the signed-in user: `me`, public
 * profiles, session refresh and profile personalization.
 *
 * Reads go through the cache (`user:{id}` and `profile:{id}`); writes
 * invalidate both keys and announce the new profile on the user's
 * realtime channel.
 */

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::backend::auth::handlers::types::PersonalizeRequest;
use crate::backend::auth::profile::{cached_profile, cached_user, invalidate};
use crate::backend::auth::sessions::update_session;
use crate::backend::auth::users::{is_taken, update_field, PublicUser};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthSession;
use crate::backend::server::state::AppState;
use crate::shared::{validation, EventType, FlowResponse, FormErrors, Personalizable, Profile};

/// Get current user handler
///
/// # Example Response
///
/// ```json
/// {
///   "id": "123e4567-e89b-12d3-a456-426614174000",
///   "name": "Anna Kovacs",
///   "email": "anna@example.com",
///   "username": "anna",
///   "phone": null,
///   "avatarUrl": null,
///   "twoFactorAuth": false,
///   ...
/// }
/// ```
pub async fn me(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> BackendResult<Json<PublicUser>> {
    let pool = state.db()?;

    let mut user = cached_user(pool, &state.cache, session.user_id)
        .await?
        .ok_or_else(|| BackendError::unauthorized("sessionInvalid"))?;

    if let Some(profile) = cached_profile(pool, &state.cache, session.user_id).await? {
        user.name = profile.name;
        user.username = profile.username;
        user.avatar_url = profile.avatar_url;
    }

    Ok(Json(user))
}

/// Public profile of any user
pub async fn profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> BackendResult<Json<Profile>> {
    let pool = state.db()?;
    cached_profile(pool, &state.cache, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| BackendError::not_found("userNotFound"))
}

/// Re-issue the session with a fresh expiry
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> BackendResult<(CookieJar, Json<FlowResponse>)> {
    let (jar, session) = update_session(&state.config, jar, &headers)?;
    let session = session.ok_or_else(|| BackendError::unauthorized("sessionInvalid"))?;

    Ok((jar, Json(FlowResponse::redirect("/account").with_session(session.token))))
}

/// Change the name, phone or username of the session user
///
/// Phone numbers are stored in E.164 form.
pub async fn personalize(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(field): Path<String>,
    Json(request): Json<PersonalizeRequest>,
) -> BackendResult<Json<Profile>> {
    let field = match field.as_str() {
        "name" => Personalizable::Name,
        "phone" => Personalizable::Phone,
        "username" => Personalizable::Username,
        _ => return Err(BackendError::not_found("fieldInvalid")),
    };

    let value = request.value.trim();
    let mut errors = FormErrors::new();
    match field {
        Personalizable::Name => errors.check("name", value, validation::name),
        Personalizable::Phone => errors.check("phone", value, validation::phone),
        Personalizable::Username => errors.check("username", value, validation::username),
    }
    errors.into_result()?;

    let value = match field {
        Personalizable::Phone => validation::normalize_phone(value)
            .ok_or_else(|| BackendError::field("phone", "phoneInvalid"))?,
        _ => value.to_string(),
    };

    let pool = state.db()?;
    if is_taken(pool, field, &value).await? {
        let code = match field {
            Personalizable::Phone => "phoneTaken",
            _ => "usernameTaken",
        };
        return Err(BackendError::field(field.field(), code));
    }

    let user = update_field(pool, session.user_id, field, &value).await?;
    invalidate(&state.cache, user.id).await;

    let profile = Profile::from(&user);
    state
        .realtime
        .publish(user.id.to_string(), EventType::ProfileUpdate, &profile);
    tracing::info!("User {} changed their {}", user.id, field.field());

    Ok(Json(profile))
}
