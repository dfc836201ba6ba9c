//! Authentication Module
//!
//! This module handles accounts and the two credentials that guard them.
//!
//! # Architecture
//!
//! - **`tokens`** - HS256 encryption, bearer parsing and credential cookies
//! - **`sessions`** - Long-lived login credential
//! - **`licenses`** - Short-lived credential for one sensitive flow
//! - **`otp`** - One-time passwords and their bcrypt hashes
//! - **`users`** - User model and database operations
//! - **`profile`** - Cached user and profile lookups
//! - **`handlers`** - HTTP handlers for authentication endpoints
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── tokens.rs       - JWT and cookie helpers
//! ├── sessions.rs     - Session credential
//! ├── licenses.rs     - License credential
//! ├── otp.rs          - One-time passwords
//! ├── users.rs        - User model and database operations
//! ├── profile.rs      - Cached reads
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Security
//!
//! - Passwords and one-time passwords are stored as bcrypt hashes
//! - Sessions last `durations.session`, licenses `durations.license`
//! - A license is only useful for its target once signed by OTP confirmation
//! - Unknown e-mails and wrong passwords fail the same way on login

/// JWT and cookie helpers
pub mod tokens;

/// Session credential
pub mod sessions;

/// License credential
pub mod licenses;

/// One-time passwords
pub mod otp;

/// User data model and database operations
pub mod users;

/// Cached user and profile lookups
pub mod profile;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use licenses::License;
pub use sessions::Session;
pub use users::{PublicUser, User};
