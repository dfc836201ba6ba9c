//! Shared Module
//!
//! This module contains types and rules that are shared between the server
//! and the client-side stores: configuration, validation, chat and file
//! models, realtime events and errors.
//!
//! # Overview
//!
//! Everything here is platform-agnostic and free of I/O apart from reading
//! configuration. Wire types use camelCase field names.

/// Application configuration
pub mod config;

/// Shared error types
pub mod error;

/// Real-time event system
pub mod event;

/// Field validation rules and form errors
pub mod validation;

/// Licensed routes, personalizable fields and flow responses
pub mod auth;

/// Chats, messages and history ordering
pub mod chat;

/// Attachments, MIME rules and upload URL pairs
pub mod files;

/// Re-export commonly used types for convenience
pub use auth::{FlowResponse, LicensedRoute, Personalizable};
pub use chat::{Chat, ChatItem, Message, Profile};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::SharedError;
pub use event::{EventType, RealtimeEvent};
pub use files::{Attachment, FileMetadata, FileUpload, UrlPair};
pub use validation::FormErrors;
