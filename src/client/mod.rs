//! Client Module
//!
//! Client-side state for chat views, usable from any Rust frontend.
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs         - Module exports
//! ├── api.rs         - Typed HTTP client
//! ├── chat_store.rs  - Optimistic per-chat store
//! └── uploads.rs     - Attachment queue and signed-URL uploads
//! ```
//!
//! # Sending a message with attachments
//!
//! 1. `FileQueue::details()` goes into the send request
//! 2. `ChatStore::push_pending` shows the message immediately
//! 3. The response's upload pairs feed `upload_all`
//! 4. `ChatStore::confirm_pending` (or `reject_pending` on failure)

/// Typed HTTP client
pub mod api;

/// Optimistic chat store
pub mod chat_store;

/// Attachment queue and uploads
pub mod uploads;

pub use api::{ApiClient, ClientError};
pub use chat_store::ChatStore;
pub use uploads::{upload_all, FileQueue, QueuedFile};
