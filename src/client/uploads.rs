//! Attachment Queue and Uploads
//!
//! Files picked for a message wait in a [`FileQueue`] that enforces the
//! same rules as the backend. After the message is sent, [`upload_all`]
//! PUTs every body to the signed URL the backend handed out for it.

use bytes::Bytes;
use futures_util::future::try_join_all;

use crate::client::api::{ApiClient, ClientError};
use crate::shared::files::{allowed_mimes, validate_file};
use crate::shared::{FileMetadata, SharedError, UrlPair};

/// A picked file: what the backend is told plus the bytes to upload
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedFile {
    pub metadata: FileMetadata,
    pub body: Bytes,
}

impl QueuedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self {
            metadata: FileMetadata {
                name: name.into(),
                size: body.len() as u64,
                mime: mime.into(),
            },
            body,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileQueue {
    max_len: usize,
    max_size: u64,
    accept: Vec<String>,
    files: Vec<QueuedFile>,
}

impl FileQueue {
    pub fn new(max_len: usize, max_size: u64, accept: &[&str]) -> Self {
        Self {
            max_len,
            max_size,
            accept: accept.iter().map(|m| m.to_string()).collect(),
            files: Vec::new(),
        }
    }

    /// Queue for chat attachments
    pub fn attachments(max_len: usize, max_size: u64) -> Self {
        Self::new(max_len, max_size, &allowed_mimes())
    }

    /// Add a batch of files, all or nothing
    ///
    /// # Errors
    ///
    /// - `lengthInvalid` for an empty batch
    /// - `lengthLarge` when the queue would hold more than `max_len` files
    /// - the first file validation error (`nameInvalid`, `sizeInvalid`, `typeInvalid`)
    pub fn add(&mut self, files: Vec<QueuedFile>) -> Result<(), SharedError> {
        if files.is_empty() {
            return Err(SharedError::validation("attachment", "lengthInvalid"));
        }
        if self.files.len() + files.len() > self.max_len {
            return Err(SharedError::validation("attachment", "lengthLarge"));
        }

        let accept: Vec<&str> = self.accept.iter().map(String::as_str).collect();
        for file in &files {
            validate_file(&file.metadata, self.max_size, &accept)?;
        }

        self.files.extend(files);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<QueuedFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Metadata sent with the message, in queue order
    pub fn details(&self) -> Vec<FileMetadata> {
        self.files.iter().map(|f| f.metadata.clone()).collect()
    }

    pub fn files(&self) -> &[QueuedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Upload each file to the signed URL at the same index
pub async fn upload_all(client: &ApiClient, files: &[QueuedFile], pairs: &[UrlPair]) -> Result<(), ClientError> {
    if files.len() != pairs.len() {
        return Err(ClientError::UploadMismatch {
            files: files.len(),
            urls: pairs.len(),
        });
    }

    try_join_all(
        files
            .iter()
            .zip(pairs)
            .map(|(file, pair)| client.put_signed(&pair.signed_url, &file.metadata.mime, file.body.clone())),
    )
    .await?;

    tracing::debug!("Uploaded {} files", files.len());
    Ok(())
}
