//! Common test utilities and helpers
//!
//! - Application and request helpers
//! - Database fixtures
//! - Authentication helpers
//! - Object store mock

#[cfg(feature = "ssr")]
pub mod app;
#[cfg(feature = "ssr")]
pub mod auth_helpers;
#[cfg(feature = "ssr")]
pub mod database;
#[cfg(feature = "ssr")]
pub mod mock_server;

#[cfg(feature = "ssr")]
pub use app::*;
#[cfg(feature = "ssr")]
pub use auth_helpers::*;
#[cfg(feature = "ssr")]
pub use database::*;
#[cfg(feature = "ssr")]
pub use mock_server::*;
