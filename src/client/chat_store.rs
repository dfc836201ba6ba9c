//! Chat Store
//!
//! Client-side state of one open chat: the loaded messages, the draft and
//! the history cursor. Sends are optimistic: a temporary message shows up
//! at once and is swapped for the server copy when the request returns.
//!
//! Messages reach the store three ways (history pages, send responses and
//! realtime events), so every insert is deduplicated by id.

use chrono::Utc;
use uuid::Uuid;

use crate::shared::chat::{order_messages, ChatItem};
use crate::shared::{Attachment, EventType, Message, Profile, RealtimeEvent};

/// An optimistic message waiting for the server
#[derive(Debug, Clone, PartialEq)]
struct Pending {
    temp_id: Uuid,
    draft: String,
}

#[derive(Debug, Clone)]
pub struct ChatStore {
    chat_id: Uuid,
    chunk: usize,
    messages: Vec<Message>,
    draft: String,
    from: usize,
    has_more: bool,
    loading: bool,
    pending: Vec<Pending>,
}

impl ChatStore {
    /// Empty store for `chat_id` loading `chunk` messages per page
    pub fn new(chat_id: Uuid, chunk: usize) -> Self {
        Self {
            chat_id,
            chunk,
            messages: Vec::new(),
            draft: String::new(),
            from: 0,
            has_more: true,
            loading: false,
            pending: Vec::new(),
        }
    }

    pub fn chat_id(&self) -> Uuid {
        self.chat_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Number of server messages already held, sent as `from`
    pub fn from(&self) -> usize {
        self.from
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn contains(&self, id: Uuid) -> bool {
        self.messages.iter().any(|m| m.id == id)
    }

    /// Append a server message unless it is already there
    fn insert(&mut self, message: Message) -> bool {
        if self.contains(message.id) {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Claim the next page: the cursor to request, or `None` when there is
    /// nothing left or a load is already running
    pub fn begin_load(&mut self) -> Option<usize> {
        if !self.has_more || self.loading {
            return None;
        }
        self.loading = true;
        Some(self.from)
    }

    /// Apply a loaded page
    pub fn finish_load(&mut self, page: Vec<Message>) {
        self.loading = false;
        if page.len() < self.chunk {
            self.has_more = false;
        }
        self.from += page.len();
        for message in page {
            self.insert(message);
        }
    }

    pub fn fail_load(&mut self) {
        self.loading = false;
    }

    /// Show a message before the server has it; returns its temporary id
    ///
    /// The draft is cleared and kept with the pending message so a failed
    /// send can restore it.
    pub fn push_pending(&mut self, author: Profile, text: Option<String>, attachments: Vec<Attachment>) -> Uuid {
        let temp_id = Uuid::new_v4();
        let now = Utc::now();
        self.messages.push(Message {
            id: temp_id,
            text,
            author,
            attachments,
            chat_id: self.chat_id,
            created_at: now,
            updated_at: now,
        });
        self.pending.push(Pending {
            temp_id,
            draft: std::mem::take(&mut self.draft),
        });
        temp_id
    }

    fn take_pending(&mut self, temp_id: Uuid) -> Option<Pending> {
        let index = self.pending.iter().position(|p| p.temp_id == temp_id)?;
        self.messages.retain(|m| m.id != temp_id);
        Some(self.pending.remove(index))
    }

    /// Replace a pending message by the stored one
    ///
    /// When realtime delivered the stored message first, the temporary one
    /// is simply dropped.
    pub fn confirm_pending(&mut self, temp_id: Uuid, message: Message) {
        if self.take_pending(temp_id).is_none() {
            tracing::debug!("Confirmed unknown pending message {}", temp_id);
        }
        if self.insert(message) {
            self.from += 1;
        }
    }

    /// Drop a pending message whose send failed and restore its draft
    pub fn reject_pending(&mut self, temp_id: Uuid) {
        if let Some(pending) = self.take_pending(temp_id) {
            self.draft = pending.draft;
        }
    }

    /// Apply a realtime event of this chat; returns whether anything changed
    pub fn apply(&mut self, event: &RealtimeEvent) -> bool {
        let message = match event.event_type {
            EventType::CreatedMessage | EventType::UpdatedMessage | EventType::DeletedMessage => {
                match event.payload_as::<Message>() {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::warn!("Ignoring malformed {} event: {}", event.event_type.as_str(), e);
                        return false;
                    }
                }
            }
            _ => return false,
        };
        if message.chat_id != self.chat_id {
            return false;
        }

        match event.event_type {
            EventType::CreatedMessage => {
                let added = self.insert(message);
                if added {
                    self.from += 1;
                }
                added
            }
            EventType::UpdatedMessage => match self.messages.iter_mut().find(|m| m.id == message.id) {
                Some(existing) => {
                    *existing = message;
                    true
                }
                None => false,
            },
            _ => {
                let before = self.messages.len();
                self.messages.retain(|m| m.id != message.id);
                let removed = self.messages.len() < before;
                if removed {
                    self.from = self.from.saturating_sub(1);
                }
                removed
            }
        }
    }

    /// Forget everything, e.g. when the chat view closes
    pub fn reset(&mut self) {
        *self = Self::new(self.chat_id, self.chunk);
    }

    /// Messages as rendered: sorted with day separators and avatar flags
    pub fn items(&self) -> Vec<ChatItem> {
        order_messages(&self.messages)
    }
}
