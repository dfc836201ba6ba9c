/**
 * Chat Route Handlers
 *
 * Chats, messages and the realtime stream. Every route needs a session.
 *
 * # Routes
 *
 * - `GET /api/chats`, `POST /api/chats`
 * - `GET /api/chat/{chat_id}`, `PATCH /api/chat/{chat_id}`
 * - `DELETE /api/chat/{chat_id}/members/me`
 * - `GET /api/chat/{chat_id}/messages?from=N`, `POST /api/chat/{chat_id}/messages`
 * - `PATCH /api/chat/{chat_id}/messages/{message_id}`,
 *   `DELETE /api/chat/{chat_id}/messages/{message_id}`
 * - `GET /api/realtime/{channel}` - Server-Sent Events
 */

use axum::{
    middleware,
    routing::{delete, get, patch},
    Router,
};

use crate::backend::chat::handlers::{
    create_chat, delete_message, edit_message, get_chat, leave_chat, list_chats, list_messages,
    rename_chat, send_message,
};
use crate::backend::middleware::auth_middleware;
use crate::backend::realtime::handle_realtime_subscription;
use crate::backend::server::state::AppState;

/// Configure chat-related routes
pub fn configure_chat_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    let chat = Router::new()
        .route("/api/chats", get(list_chats).post(create_chat))
        .route("/api/chat/{chat_id}", get(get_chat).patch(rename_chat))
        .route("/api/chat/{chat_id}/members/me", delete(leave_chat))
        .route(
            "/api/chat/{chat_id}/messages",
            get(list_messages).post(send_message),
        )
        .route(
            "/api/chat/{chat_id}/messages/{message_id}",
            patch(edit_message).delete(delete_message),
        )
        .route("/api/realtime/{channel}", get(handle_realtime_subscription))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    router.merge(chat)
}
