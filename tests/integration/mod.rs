//! Integration tests against the in-process router

mod api;
mod database;
mod realtime;
