/**
 * Chat Handlers
 *
 * Listing, creating, renaming and leaving chats. A chat is only visible to
 * its members; anyone else gets `chatNotFound`.
 *
 * Chat-level events go to the chat channel (`updated-chat`, `deleted-chat`,
 * `left-chat`), except `created-chat`, which goes to the user channel of
 * every member since nobody is subscribed to the new chat yet.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::backend::auth::users::{get_user_by_id, get_users_by_usernames};
use crate::backend::chat::db::{self, LeaveOutcome};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthSession;
use crate::backend::server::state::AppState;
use crate::shared::chat::{CreateChatRequest, RenameChatRequest};
use crate::shared::{validation, Chat, EventType, FormErrors};

/// Chats of the session user, most recently active first
pub async fn list_chats(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> BackendResult<Json<Vec<Chat>>> {
    let pool = state.db()?;
    Ok(Json(db::list_chats(pool, session.user_id).await?))
}

pub async fn get_chat(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(chat_id): Path<Uuid>,
) -> BackendResult<Json<Chat>> {
    let pool = state.db()?;
    db::get_chat(pool, chat_id, session.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| BackendError::not_found("chatNotFound"))
}

/// Usernames of the other members: trimmed, deduplicated, without the creator
fn other_usernames(usernames: &[String], own: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for username in usernames.iter().map(|u| u.trim()) {
        if !username.is_empty() && username != own && !seen.iter().any(|s| s == username) {
            seen.push(username.to_string());
        }
    }
    seen
}

/// Start a chat with one or more other users
///
/// # Errors
///
/// - `422` `name` with the chat-name rule when a name is given
/// - `422` `usernames` `membersInsufficient` without another member
/// - `422` `usernames` `userNotFound` when a username is unknown
pub async fn create_chat(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(request): Json<CreateChatRequest>,
) -> BackendResult<Json<Chat>> {
    let name = request.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let mut errors = FormErrors::new();
    if let Some(name) = name {
        errors.check("name", name, validation::chat_name);
    }
    errors.into_result()?;

    let pool = state.db()?;
    let creator = get_user_by_id(pool, session.user_id)
        .await?
        .ok_or_else(|| BackendError::unauthorized("sessionInvalid"))?;

    let usernames = other_usernames(&request.usernames, &creator.username);
    if usernames.is_empty() {
        return Err(BackendError::field("usernames", "membersInsufficient"));
    }
    let others = get_users_by_usernames(pool, &usernames).await?;
    if others.len() != usernames.len() {
        return Err(BackendError::field("usernames", "userNotFound"));
    }

    let mut member_ids: Vec<Uuid> = others.iter().map(|u| u.id).collect();
    member_ids.push(creator.id);

    let chat_id = db::create_chat(pool, name, &member_ids).await?;
    let chat = db::get_chat(pool, chat_id, creator.id)
        .await?
        .ok_or_else(|| BackendError::state("created chat is not readable"))?;

    for member in &chat.members {
        state
            .realtime
            .publish(member.id.to_string(), EventType::CreatedChat, &chat);
    }
    tracing::info!("User {} created chat {} with {} members", creator.id, chat.id, chat.members.len());

    Ok(Json(chat))
}

/// Rename a chat the session user belongs to
pub async fn rename_chat(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(chat_id): Path<Uuid>,
    Json(request): Json<RenameChatRequest>,
) -> BackendResult<Json<Chat>> {
    let name = request.name.trim();
    let mut errors = FormErrors::new();
    errors.check("name", name, validation::chat_name);
    errors.into_result()?;

    let pool = state.db()?;
    let outcome = db::leave_chat(pool, chat_id, session.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("chatNotFound"))?;

    let channel = chat_id.to_string();
    match outcome {
        LeaveOutcome::Deleted => {
            state
                .realtime
                .publish(channel, EventType::DeletedChat, &json!({ "id": chat_id }));
            tracing::info!("Chat {} deleted after user {} left", chat_id, session.user_id);
        }
        LeaveOutcome::Left => {
            state.realtime.publish(
                channel,
                EventType::LeftChat,
                &json!({ "chatId": chat_id, "userId": session.user_id }),
            );
            tracing::info!("User {} left chat {}", session.user_id, chat_id);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
