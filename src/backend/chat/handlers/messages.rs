/**
 * Message Handlers
 *
 * History, send, edit and delete. Every change is published on the chat
 * channel so open chat views can apply it without refetching.
 *
 * Sending never carries file bytes: the request lists attachment metadata,
 * the response hands back one signed upload URL per file in the same order.
 */

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use uuid::Uuid;

use crate::backend::chat::db;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::files::create_files;
use crate::backend::middleware::AuthSession;
use crate::backend::server::state::AppState;
use crate::shared::chat::{EditMessageRequest, HistoryQuery, SendMessageRequest, SendMessageResponse};
use crate::shared::config::Lengths;
use crate::shared::files::{allowed_mimes, validate_file, Folder};
use crate::shared::{EventType, Message};

/// Trimmed text, `None` when blank
fn message_text(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Check a message before anything is stored
///
/// Long text is only refused when the message has no attachments.
fn check_message(request: &SendMessageRequest, lengths: &Lengths) -> BackendResult<()> {
    let text = message_text(request.text.as_deref());

    if text.is_none() && request.files.is_empty() {
        return Err(BackendError::field("text", "messageInsufficient"));
    }
    if request.files.is_empty() && text.is_some_and(|t| t.chars().count() > lengths.message_length) {
        return Err(BackendError::field("text", "messageLong"));
    }
    if request.files.len() > lengths.attachments {
        return Err(BackendError::field("attachment", "lengthLarge"));
    }

    let mimes = allowed_mimes();
    for file in &request.files {
        validate_file(file, lengths.attachment_size, &mimes)?;
    }
    Ok(())
}

fn check_edit(text: &str, lengths: &Lengths) -> BackendResult<()> {
    if text.is_empty() {
        return Err(BackendError::field("text", "messageInsufficient"));
    }
    if text.chars().count() > lengths.message_length {
        return Err(BackendError::field("text", "messageLong"));
    }
    Ok(())
}

/// One page of history, oldest first
///
/// `from` is the number of messages the client already holds.
pub async fn list_messages(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(chat_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> BackendResult<Json<Vec<Message>>> {
    let pool = state.db()?;
    if !db::is_member(pool, chat_id, session.user_id).await? {
        return Err(BackendError::not_found("chatNotFound"));
    }

    let messages = db::list_messages(pool, chat_id, query.from, state.config.lengths.message_chunk).await?;
    tracing::debug!("Loaded {} messages of chat {} from {}", messages.len(), chat_id, query.from);
    Ok(Json(messages))
}

/// Send a message with optional attachments
pub async fn send_message(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(chat_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> BackendResult<Json<SendMessageResponse>> {
    check_message(&request, &state.config.lengths)?;

    let pool = state.db()?;
    if !db::is_member(pool, chat_id, session.user_id).await? {
        return Err(BackendError::not_found("chatNotFound"));
    }

    let uploads = create_files(
        pool,
        &state.storage,
        &request.files,
        Folder::Attachments,
        session.user_id,
        state.config.durations.upload,
    )
    .await?;
    let file_ids: Vec<Uuid> = uploads.iter().map(|u| u.attachment.id).collect();

    let text = message_text(request.text.as_deref());
    let message = db::insert_message(pool, chat_id, session.user_id, text, &file_ids)
        .await?
        .ok_or_else(|| BackendError::state("stored message is not readable"))?;

    state
        .realtime
        .publish(chat_id.to_string(), EventType::CreatedMessage, &message);
    tracing::info!(
        "User {} sent message {} to chat {} with {} attachments",
        session.user_id,
        message.id,
        chat_id,
        uploads.len()
    );

    Ok(Json(SendMessageResponse { message, uploads }))
}

/// Replace the text of one of the caller's messages
pub async fn edit_message(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path((chat_id, message_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<EditMessageRequest>,
) -> BackendResult<Json<Message>> {
    let text = request.text.trim();
    check_edit(text, &state.config.lengths)?;

    let pool = state.db()?;
    let message = db::update_message(pool, chat_id, message_id, session.user_id, text)
        .await?
        .ok_or_else(|| BackendError::forbidden("messageInvalid"))?;

    state
        .realtime
        .publish(chat_id.to_string(), EventType::UpdatedMessage, &message);
    tracing::info!("User {} edited message {}", session.user_id, message.id);

    Ok(Json(message))
}

/// Delete one of the caller's messages and the objects of its attachments
pub async fn delete_message(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path((chat_id, message_id)): Path<(Uuid, Uuid)>,
) -> BackendResult<Json<Message>> {
    let pool = state.db()?;
    let message = db::delete_message(pool, chat_id, message_id, session.user_id)
        .await?
        .ok_or_else(|| BackendError::forbidden("messageInvalid"))?;

    for attachment in &message.attachments {
        let Some(key) = state.storage.key_of(&attachment.url) else {
            continue;
        };
        if let Err(e) = state.storage.delete_object(&key).await {
            tracing::error!("Failed to delete attachment object {}: {}", key, e);
        }
    }

    state
        .realtime
        .publish(chat_id.to_string(), EventType::DeletedMessage, &message);
    tracing::info!("User {} deleted message {}", session.user_id, message.id);

    Ok(Json(message))
}
