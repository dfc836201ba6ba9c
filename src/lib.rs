// Increase recursion limit for complex async operations
#![recursion_limit = "256"]

//! Nordaun - Main Library
//!
//! Nordaun is a multi-tenant account and chat service. Users sign in with a
//! long-lived session, prove control of their mailbox with one-time passwords
//! before sensitive changes, and talk in real-time chats whose attachments
//! are uploaded straight to object storage through signed URLs.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between server and clients
//!   - Configuration, validation rules, chat and file models
//!   - Realtime events and error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server and routes
//!   - Session and license credentials, e-mail OTP verification
//!   - Chats, messages, attachments and avatars
//!   - Cache, rate limiting, mail, object storage, realtime hub
//!
//! - **`client`** - Client-side state
//!   - Chat store with optimistic sends and paginated history
//!   - Attachment queue and signed-URL upload orchestration
//!   - Typed HTTP client
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend modules and the server binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use nordaun::backend::server::init::create_app;
//! use nordaun::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let app = create_app(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for validation and serialization failures
//! - `backend::BackendError` for everything a handler can fail with
//! - `client::ClientError` for HTTP client failures
/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// Client-side chat state and upload orchestration
pub mod client;
