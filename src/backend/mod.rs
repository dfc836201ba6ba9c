//! Backend Module
//!
//! This module contains all server-side code for Nordaun: the Axum HTTP
//! server, accounts and credentials, chats, files and the realtime hub.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, connections
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Accounts, sessions, licenses and one-time passwords
//! - **`chat`** - Chats, members and messages
//! - **`files`** - Upload reservations, avatars and file deletion
//! - **`realtime`** - Per-channel event hub and SSE subscriptions
//! - **`middleware`** - Session checks and rate limiting
//! - **`cache`** - Read-through cache over Redis or memory
//! - **`ratelimit`** - Fixed-window limiter over Redis or memory
//! - **`mail`** - SMTP mailer and e-mail templates
//! - **`storage`** - S3-compatible object store with presigned URLs
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── auth/           - Accounts and credentials
//! ├── chat/           - Chats and messages
//! ├── files/          - Files and avatars
//! ├── realtime/       - Event hub and SSE
//! ├── middleware/     - Request middleware
//! ├── cache/          - Cache stores
//! ├── ratelimit/      - Rate limiter
//! ├── mail/           - Mailer
//! ├── storage/        - Object store
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds cloneable handles: configuration, the optional
//! Postgres pool, cache, limiter, realtime hub, mailer, object store and an
//! HTTP client. Without a database the server still starts and
//! database-backed routes answer 503.
//!
//! # Error Handling
//!
//! Handlers return `BackendResult<T>`. `BackendError` renders
//! `{ "error": key, "status": code, "errors"?: { field: [codes] } }` and
//! logs infrastructure failures before answering `unexpectedError`.
//!
//! # Example
//!
//! ```rust,no_run
//! use nordaun::backend::server::create_app;
//! use nordaun::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(AppConfig::load()?).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Authentication and user management
pub mod auth;

/// Chats and messages
pub mod chat;

/// Files and avatars
pub mod files;

/// Real-time update system
pub mod realtime;

/// Middleware for request processing
pub mod middleware;

/// Read-through cache
pub mod cache;

/// Request rate limiting
pub mod ratelimit;

/// Outgoing e-mail
pub mod mail;

/// Object storage
pub mod storage;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use error::{BackendError, BackendResult};
pub use realtime::RealtimeHub;
pub use server::{create_app, AppState};
