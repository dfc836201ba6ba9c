/**
 * Real-time Event Broadcasting
 *
 * The hub keeps one `tokio::sync::broadcast` sender per channel. A channel
 * is a chat id (message and chat events) or a user id (profile, avatar and
 * new-chat events). Senders are created on first use and swept once no
 * receiver is left.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::broadcast;

use crate::shared::{EventType, RealtimeEvent};

/// Buffered events per channel before slow receivers start lagging
const CHANNEL_CAPACITY: usize = 100;

#[derive(Clone, Debug, Default)]
pub struct RealtimeHub {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<RealtimeEvent>>>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<RealtimeEvent>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Receive every event published on `channel` from now on
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<RealtimeEvent> {
        self.channels()
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event, returning how many receivers got it
    pub fn publish<T: Serialize>(&self, channel: impl Into<String>, event_type: EventType, payload: &T) -> usize {
        let payload = match serde_json::to_value(payload) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("[Realtime] Failed to serialize {} payload: {:?}", event_type.as_str(), e);
                return 0;
            }
        };
        let event = RealtimeEvent::new(channel, event_type, payload);

        let sender = self.channels().get(&event.channel).cloned();
        match sender.map(|tx| tx.send(event)) {
            Some(Ok(count)) => {
                tracing::debug!("[Realtime] {} delivered to {} subscribers", event_type.as_str(), count);
                count
            }
            _ => {
                tracing::debug!("[Realtime] No subscribers for {}", event_type.as_str());
                0
            }
        }
    }

    /// Drop senders whose receivers are all gone
    pub fn cleanup_inactive_channels(&self) -> usize {
        let mut channels = self.channels();
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        before - channels.len()
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels()
            .get(channel)
            .map_or(0, |sender| sender.receiver_count())
    }

    pub fn channel_count(&self) -> usize {
        self.channels().len()
    }
}
