//! Chat Backend Module
//!
//! Server-side chats: membership, message history and message changes.
//! Chats and messages live in Postgres; every change is announced through
//! the realtime hub.
//!
//! # Architecture
//!
//! - **`db`** - Chats, members and messages in the database
//! - **`handlers`** - HTTP handlers for chat and message endpoints
//!
//! # Example
//!
//! ```rust,no_run
//! use nordaun::backend::chat::db;
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
//! for chat in db::list_chats(&pool, user_id).await? {
//!     let page = db::list_messages(&pool, chat.id, 0, 20).await?;
//!     println!("{} messages in {}", page.len(), chat.id);
//! }
//! # Ok(())
//! # }
//! ```

/// Database operations for chats and messages
pub mod db;

/// HTTP handlers
pub mod handlers;

pub use handlers::{
    create_chat, delete_message, edit_message, get_chat, leave_chat, list_chats, list_messages,
    rename_chat, send_message,
};
