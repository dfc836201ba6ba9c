//! Files Module
//!
//! Uploads never pass through the server. For each announced file the
//! server reserves an object key, stores a row and hands back a signed PUT
//! URL plus the public CDN URL the object will be served from.
//!
//! # Module Structure
//!
//! ```text
//! files/
//! ├── mod.rs       - Upload planning, create and delete
//! ├── db.rs        - Rows of the files table
//! └── handlers.rs  - Avatar upload and file deletion endpoints
//! ```

/// Database operations
pub mod db;

/// HTTP handlers
pub mod handlers;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::storage::ObjectStore;
use crate::shared::files::{file_extension, Folder};
use crate::shared::{Attachment, FileMetadata, FileUpload, UrlPair};

use db::{delete_file_row, insert_files, FileRecord};

pub use handlers::{delete_file_handler, upload_avatar};

/// Object key of a file: `{folder}/{id}.{ext}`
pub fn object_key(folder: Folder, id: Uuid, mime: &str) -> String {
    format!("{}/{}.{}", folder.as_str(), id, file_extension(mime))
}

/// Reserve keys and sign upload URLs, without touching the database
///
/// Returns the rows to insert and the upload slots, both in input order.
/// Creation times step by one microsecond so a batch reads back in the
/// order it was announced.
pub fn plan_uploads(
    store: &ObjectStore,
    files: &[FileMetadata],
    folder: Folder,
    author_id: Uuid,
    expires: u64,
) -> BackendResult<(Vec<FileRecord>, Vec<FileUpload>)> {
    let now = Utc::now();
    let mut records = Vec::with_capacity(files.len());
    let mut uploads = Vec::with_capacity(files.len());

    for (index, file) in files.iter().enumerate() {
        let id = Uuid::new_v4();
        let created_at = now + Duration::microseconds(index as i64);
        let key = object_key(folder, id, &file.mime);
        let signed_url = store.presign("PUT", &key, Some(&file.mime), expires, now)?;
        let public_url = store.public_url(&key);
        let size = i64::try_from(file.size).map_err(|_| BackendError::field("attachment", "sizeInvalid"))?;

        let record = FileRecord {
            id,
            name: file.name.clone(),
            size,
            mime: file.mime.clone(),
            url: public_url.clone(),
            folder: Some(folder.as_str().to_string()),
            author_id,
            message_id: None,
            created_at,
        };
        uploads.push(FileUpload {
            attachment: Attachment::from(&record),
            urls: UrlPair {
                signed_url,
                public_url,
            },
        });
        records.push(record);
    }

    Ok((records, uploads))
}

/// Store rows for `files` and return their upload slots in input order
pub async fn create_files(
    pool: &PgPool,
    store: &ObjectStore,
    files: &[FileMetadata],
    folder: Folder,
    author_id: Uuid,
    expires: u64,
) -> BackendResult<Vec<FileUpload>> {
    let (records, uploads) = plan_uploads(store, files, folder, author_id, expires)?;
    insert_files(pool, &records).await?;
    tracing::info!("Reserved {} uploads in {}", uploads.len(), folder.as_str());
    Ok(uploads)
}

/// Delete a file written by `author_id`
///
/// Returns `None` when the file does not exist or belongs to someone else.
/// A failed object deletion is logged; the row is gone either way.
pub async fn delete_file(
    pool: &PgPool,
    store: &ObjectStore,
    id: Uuid,
    author_id: Uuid,
) -> BackendResult<Option<Attachment>> {
    let Some(record) = delete_file_row(pool, id, author_id).await? else {
        return Ok(None);
    };

    let key = store
        .key_of(&record.url)
        .unwrap_or_else(|| format!("{}/{}.{}", record.folder.as_deref().unwrap_or_default(), record.id, file_extension(&record.mime)));
    if let Err(e) = store.delete_object(&key).await {
        tracing::error!("Failed to delete object {}: {}", key, e);
    }

    Ok(Some(Attachment::from(&record)))
}
