//! Chat Handlers Module
//!
//! This module contains all Axum handlers for chat endpoints. Every handler
//! requires a session; membership decides what a user may see or change.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── chats.rs     - List, create, rename and leave chats
//! └── messages.rs  - History, send, edit and delete messages
//! ```
//!
//! # Route Handlers
//!
//! ## GET /api/chat/{chat_id}/messages?from=N
//!
//! Returns one chunk of history, oldest first, skipping the `N` newest
//! messages the client already holds.
//!
//! ## POST /api/chat/{chat_id}/messages
//!
//! Stores a message and answers with one signed upload URL per announced
//! attachment. The client uploads the files itself.
//!
//! # Events
//!
//! | Handler          | Channel        | Event             |
//! |------------------|----------------|-------------------|
//! | `send_message`   | chat           | `created-message` |
//! | `edit_message`   | chat           | `updated-message` |
//! | `delete_message` | chat           | `deleted-message` |
//! | `create_chat`    | each member    | `created-chat`    |
//! | `rename_chat`    | chat           | `updated-chat`    |
//! | `leave_chat`     | chat           | `deleted-chat` or `left-chat` |

/// Chat handlers
pub mod chats;

/// Message handlers
pub mod messages;

pub use chats::{create_chat, get_chat, leave_chat, list_chats, rename_chat};
pub use messages::{delete_message, edit_message, list_messages, send_message};
