/**
 * File Handlers
 *
 * `POST /api/files/avatar` reserves an upload slot for a new avatar and
 * points the profile at it. `DELETE /api/files/{file_id}` removes a file
 * the caller wrote.
 */

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::backend::auth::profile::invalidate;
use crate::backend::auth::users::{get_user_by_id, set_avatar};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::files::{create_files, delete_file};
use crate::backend::middleware::AuthSession;
use crate::backend::server::state::AppState;
use crate::shared::files::{validate_file, Folder, IMAGE_MIMES};
use crate::shared::{Attachment, EventType, FileMetadata, FileUpload};

/// Reserve an avatar upload for the session user
///
/// The previous avatar file is deleted first. The client PUTs the image to
/// the returned `signedUrl`; the profile already points at `publicUrl`.
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(metadata): Json<FileMetadata>,
) -> BackendResult<Json<FileUpload>> {
    validate_file(&metadata, state.config.lengths.avatar_size, IMAGE_MIMES)?;

    let pool = state.db()?;
    let user = get_user_by_id(pool, session.user_id)
        .await?
        .ok_or_else(|| BackendError::unauthorized("sessionInvalid"))?;

    let upload = create_files(
        pool,
        &state.storage,
        std::slice::from_ref(&metadata),
        Folder::Avatar,
        user.id,
        state.config.durations.upload,
    )
    .await?
    .into_iter()
    .next()
    .ok_or_else(|| BackendError::state("no upload slot reserved for avatar"))?;

    let previous = user.avatar_id;
    let user = set_avatar(pool, user.id, upload.attachment.id, &upload.urls.public_url).await?;
    invalidate(&state.cache, user.id).await;

    // The old file only goes once the new one is in place
    if let Some(old) = previous.filter(|old| *old != upload.attachment.id) {
        match delete_file(pool, &state.storage, old, user.id).await {
            Ok(Some(_)) => {}
            Ok(None) => tracing::warn!("Previous avatar {} of user {} was already gone", old, user.id),
            Err(e) => tracing::error!("Failed to remove previous avatar {} of user {}: {}", old, user.id, e),
        }
    }

    state.realtime.publish(
        user.id.to_string(),
        EventType::AvatarUpdate,
        &json!({ "url": upload.urls.public_url }),
    );
    tracing::info!("User {} changed their avatar", user.id);

    Ok(Json(upload))
}

/// Delete a file written by the session user
pub async fn delete_file_handler(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(file_id): Path<Uuid>,
) -> BackendResult<Json<Attachment>> {
    let pool = state.db()?;
    delete_file(pool, &state.storage, file_id, session.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| BackendError::not_found("fileNotFound"))
}
