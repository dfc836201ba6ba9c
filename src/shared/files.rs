//! File and attachment types
//!
//! Uploads never pass through the server. A client announces the metadata of
//! each file, the server answers with a signed upload URL plus the public URL
//! the object will be served from, and the client PUTs the bytes directly to
//! the object store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::SharedError;

/// Accepted `application/*` subtypes
pub const APPLICATION_MIMES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// Accepted `video/*` subtypes
pub const VIDEO_MIMES: &[&str] = &[
    "video/webm",
    "video/mp4",
    "video/mpeg",
    "video/ogg",
    "video/quicktime",
];

/// Accepted `image/*` subtypes
pub const IMAGE_MIMES: &[&str] = &[
    "image/webp",
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/heic",
    "image/heif",
];

/// Accepted `text/*` subtypes
pub const TEXT_MIMES: &[&str] = &["text/plain", "text/csv", "text/xml"];

/// Every MIME type accepted as a chat attachment
pub fn allowed_mimes() -> Vec<&'static str> {
    [APPLICATION_MIMES, VIDEO_MIMES, IMAGE_MIMES, TEXT_MIMES].concat()
}

/// Bucket folder an object is stored under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Folder {
    Avatar,
    Attachments,
}

impl Folder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Attachments => "attachments",
        }
    }
}

/// What a client announces before uploading a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime: String,
}

/// A stored file as shown on a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime: String,
    pub url: String,
}

/// Where to upload a file and where it will be readable afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlPair {
    pub signed_url: String,
    pub public_url: String,
}

/// An attachment together with its upload URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    pub attachment: Attachment,
    #[serde(flatten)]
    pub urls: UrlPair,
}

/// Check name, size and type of a file before it is uploaded
///
/// Fails with `nameInvalid`, `sizeInvalid` (detail: the formatted limit) or
/// `typeInvalid`, checked in that order.
pub fn validate_file(file: &FileMetadata, max_size: u64, mimes: &[&str]) -> Result<(), SharedError> {
    let name_ok = !file.name.is_empty()
        && file
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ' '));
    if !name_ok {
        return Err(SharedError::file(&file.name, "nameInvalid", None));
    }
    if file.size > max_size {
        return Err(SharedError::file(
            &file.name,
            "sizeInvalid",
            Some(format_file_size(max_size)),
        ));
    }
    if !mimes.contains(&file.mime.as_str()) {
        return Err(SharedError::file(&file.name, "typeInvalid", None));
    }
    Ok(())
}

/// Human readable size with 1024-based units, e.g. `128 B` or `1.50 KB`
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut unit = 0;
    let mut size = bytes as f64;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if size.fract() == 0.0 {
        format!("{} {}", size as u64, UNITS[unit])
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}

/// Subtype of a MIME type, used as the object extension
pub fn file_extension(mime: &str) -> &str {
    mime.split('/').nth(1).filter(|ext| !ext.is_empty()).unwrap_or("unknown")
}

/// Last path segment of a URL, or `file`
pub fn file_name(url: &str) -> &str {
    url.rsplit('/').next().filter(|name| !name.is_empty()).unwrap_or("file")
}
