//! API integration tests

mod auth_test;
mod chat_test;
mod files_test;
