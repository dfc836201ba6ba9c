//! Server Module
//!
//! This module contains all server-side code for initializing and configuring
//! the Axum HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Database and Redis connection loading
//! - **`init`** - State building and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Connection loading (database, Redis)
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration**: `AppConfig::load()` reads the TOML file and environment
//! 2. **Connections**: PostgreSQL and Redis are connected when configured
//! 3. **State Creation**: cache, limiter, hub, mailer and store handles
//! 4. **Background Tasks**: the realtime channel sweeper
//! 5. **Router Creation**: routes and middleware

/// Application state management
pub mod state;

/// Connection loading
pub mod config;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use init::create_app;
pub use state::AppState;
