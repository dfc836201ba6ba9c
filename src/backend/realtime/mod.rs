//! Real-time Update Module
//!
//! In-process pub/sub for chat and profile events, served to browsers as
//! Server-Sent Events.
//!
//! # Architecture
//!
//! - **`broadcast`** - The hub: one broadcast sender per channel
//! - **`subscription`** - Server-Sent Events subscription handler
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── broadcast.rs    - Channel hub
//! └── subscription.rs - SSE subscription handler
//! ```
//!
//! # Channels
//!
//! - chat id: `created-message`, `updated-message`, `deleted-message`,
//!   `updated-chat`, `deleted-chat`, `left-chat`
//! - user id: `created-chat`, `profile-update`, `avatar-update`
//!
//! # Example
//!
//! ```rust,no_run
//! use nordaun::backend::realtime::RealtimeHub;
//! use nordaun::shared::EventType;
//!
//! # async fn example() {
//! let hub = RealtimeHub::new();
//! let mut rx = hub.subscribe("chat-id");
//! hub.publish("chat-id", EventType::DeletedChat, &serde_json::json!({ "id": "chat-id" }));
//! let event = rx.recv().await;
//! # }
//! ```

/// Channel hub
pub mod broadcast;

/// Server-Sent Events subscription handler
pub mod subscription;

pub use broadcast::RealtimeHub;
pub use subscription::handle_realtime_subscription;
