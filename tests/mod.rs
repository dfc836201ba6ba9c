//! Test suite for Nordaun
//!
//! Integration tests drive the router in-process with `tower::ServiceExt`.
//! Tests that need Postgres run only when `DATABASE_URL` is set.

pub mod common;
#[cfg(feature = "ssr")]
pub mod integration;
pub mod property;
