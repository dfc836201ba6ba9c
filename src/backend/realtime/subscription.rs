/**
 * Real-time Subscription Handler
 *
 * `GET /api/realtime/{channel}` streams the events of one channel as
 * Server-Sent Events. A channel is either the caller's own user id or the
 * id of a chat the caller belongs to.
 *
 * # Connection Management
 *
 * - Connections are kept alive using the SSE keep-alive mechanism
 * - Lagged receivers skip what they missed and keep streaming
 * - The stream ends when the hub drops the channel
 */

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;
use tokio_stream::Stream;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::backend::chat::db::is_member;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthSession;
use crate::backend::server::state::AppState;
use crate::shared::RealtimeEvent;

/// SSE frame of an event: `event:` is the event name, `data:` the whole event as JSON
pub fn sse_event(event: &RealtimeEvent) -> Result<Event, serde_json::Error> {
    let data = serde_json::to_string(event)?;
    Ok(Event::default().event(event.event_type.as_str()).data(data))
}

/// Whether the caller may listen on `channel`
async fn may_subscribe(state: &AppState, channel: &str, user_id: Uuid) -> BackendResult<bool> {
    let Ok(channel_id) = Uuid::parse_str(channel) else {
        return Ok(false);
    };
    if channel_id == user_id {
        return Ok(true);
    }
    Ok(is_member(state.db()?, channel_id, user_id).await?)
}

/// Handle real-time subscription (GET /api/realtime/{channel})
///
/// # Example Response
///
/// ```http
/// HTTP/1.1 200 OK
/// Content-Type: text/event-stream
///
/// event: created-message
/// data: {"channel":"...","event_type":"created-message","payload":{...},"timestamp":"..."}
/// ```
pub async fn handle_realtime_subscription(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(channel): Path<String>,
) -> BackendResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    if !may_subscribe(&state, &channel, session.user_id).await? {
        tracing::warn!("[Realtime] User {} refused on channel {}", session.user_id, channel);
        return Err(BackendError::forbidden("channelForbidden"));
    }

    let rx = state.realtime.subscribe(&channel);
    tracing::info!("[Realtime] User {} subscribed to {}", session.user_id, channel);

    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match sse_event(&event) {
                    Ok(frame) => return Some((Ok(frame), rx)),
                    Err(e) => {
                        tracing::error!("[Realtime] Failed to serialize event: {:?}", e);
                        continue;
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Realtime] Receiver lagged, skipped {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("[Realtime] Channel closed, ending stream");
                    return None;
                }
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::middleware::AuthenticatedUser;
    use crate::shared::{AppConfig, EventType};

    fn state() -> AppState {
        let config = AppConfig::builder()
            .jwt_secret("realtime-secret-that-is-long-enough")
            .build()
            .unwrap();
        AppState::new(config, None).unwrap()
    }

    #[test]
    fn test_sse_event_serializes() {
        let event = RealtimeEvent::new("chat-1", EventType::DeletedChat, serde_json::json!({ "id": 1 }));
        assert!(sse_event(&event).is_ok());
    }

    #[tokio::test]
    async fn test_own_user_channel_allowed_without_database() {
        let user_id = Uuid::new_v4();
        assert!(may_subscribe(&state(), &user_id.to_string(), user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_non_uuid_channel_refused() {
        assert!(!may_subscribe(&state(), "everything", Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_foreign_channel_needs_database() {
        let err = may_subscribe(&state(), &Uuid::new_v4().to_string(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "serviceUnavailable");
    }

    #[tokio::test]
    async fn test_subscription_refused_for_foreign_string() {
        let session = AuthSession(AuthenticatedUser {
            user_id: Uuid::new_v4(),
            token: String::new(),
        });
        let result = handle_realtime_subscription(State(state()), session, Path("nope".to_string())).await;
        assert_eq!(result.err().map(|e| e.message()), Some("channelForbidden".to_string()));
    }
}
