//! Middleware Module
//!
//! This module contains all HTTP middleware for the backend server.
//! Middleware functions are used to process requests before they reach
//! handlers.
//!
//! # Architecture
//!
//! - **`auth`** - Session middleware and the `AuthSession` / `AuthLicense` extractors
//! - **`ratelimit`** - Per-IP fixed-window rate limiting
//!
//! # Example
//!
//! ```rust,no_run
//! use nordaun::backend::middleware::{auth_middleware, rate_limit_middleware};
//!
//! // let protected = routes.route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
//! // let app = app.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
//! ```

pub mod auth;

pub mod ratelimit;

pub use auth::{auth_middleware, AuthLicense, AuthSession, AuthenticatedUser};
pub use ratelimit::{client_ip, rate_limit_middleware};
