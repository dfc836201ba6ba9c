//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//! Routes are organized by functionality into focused submodules.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Router assembly and layers
//! ├── api_routes.rs   - Accounts, profiles and files
//! └── chat_routes.rs  - Chats, messages and realtime
//! ```

/// Main router creation
pub mod router;

/// Chat, message and realtime routes
pub mod chat_routes;

/// Account, profile and file routes
pub mod api_routes;

pub use router::create_router;
