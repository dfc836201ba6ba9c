//! Authentication Handlers Module
//!
//! This module contains all HTTP handlers for authentication endpoints.
//! Handlers are organized into focused submodules for maintainability.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Request and response types
//! ├── signup.rs   - User registration
//! ├── login.rs    - Login (with optional 2FA) and logout
//! ├── verify.rs   - OTP mail and confirmation
//! ├── account.rs  - Licensed flows and 2FA toggle
//! ├── me.rs       - Current user, profiles, refresh, personalize
//! └── google.rs   - Google OAuth
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Signup / Login**: credentials checked, session issued
//! 2. **Verify**: OTP mailed, unsigned license issued for a target
//! 3. **Confirm**: OTP checked, license signed, session issued
//! 4. **Licensed flow**: the signed license unlocks exactly its target
//!
//! Every flow answers `{ redirect, session?, license? }` and sets the
//! matching cookies.

/// Request and response types
pub mod types;

/// Signup handler
pub mod signup;

/// Login and logout handlers
pub mod login;

/// Verification handlers
pub mod verify;

/// Licensed account handlers
pub mod account;

/// Current user handlers
pub mod me;

/// Google OAuth handlers
pub mod google;

pub use types::{LoginRequest, SignupRequest};

pub use account::{migrate_email, reset_password, terminate_account, toggle_2fa};
pub use google::{google_callback, google_start};
pub use login::{login, logout};
pub use me::{me, personalize, profile, refresh};
pub use signup::signup;
pub use verify::{confirm, verify};
