/**
 * Database Operations for Files
 *
 * Rows of the `files` table. A file belongs to its author, may sit in a
 * folder (`avatar` or `attachments`) and is linked to at most one message.
 */

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::shared::Attachment;

const FILE_COLUMNS: &str = "id, name, size, mime, url, folder, author_id, message_id, created_at";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FileRecord {
    pub id: Uuid,
    pub name: String,
    pub size: i64,
    pub mime: String,
    pub url: String,
    pub folder: Option<String>,
    pub author_id: Uuid,
    pub message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&FileRecord> for Attachment {
    fn from(record: &FileRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            size: u64::try_from(record.size).unwrap_or_default(),
            mime: record.mime.clone(),
            url: record.url.clone(),
        }
    }
}

/// Insert every record with a single statement
pub async fn insert_files(pool: &PgPool, records: &[FileRecord]) -> Result<(), sqlx::Error> {
    if records.is_empty() {
        return Ok(());
    }

    let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    let sizes: Vec<i64> = records.iter().map(|r| r.size).collect();
    let mimes: Vec<&str> = records.iter().map(|r| r.mime.as_str()).collect();
    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    let folders: Vec<Option<&str>> = records.iter().map(|r| r.folder.as_deref()).collect();
    let authors: Vec<Uuid> = records.iter().map(|r| r.author_id).collect();
    let created: Vec<DateTime<Utc>> = records.iter().map(|r| r.created_at).collect();

    sqlx::query(
        r#"
        INSERT INTO files (id, name, size, mime, url, folder, author_id, created_at)
        SELECT * FROM UNNEST($1::uuid[], $2::text[], $3::bigint[], $4::text[], $5::text[],
                             $6::text[], $7::uuid[], $8::timestamptz[])
        "#,
    )
    .bind(&ids)
    .bind(&names)
    .bind(&sizes)
    .bind(&mimes)
    .bind(&urls)
    .bind(&folders)
    .bind(&authors)
    .bind(&created)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a file row if `author_id` wrote it
pub async fn delete_file_row(pool: &PgPool, id: Uuid, author_id: Uuid) -> Result<Option<FileRecord>, sqlx::Error> {
    sqlx::query_as::<_, FileRecord>(&format!(
        "DELETE FROM files WHERE id = $1 AND author_id = $2 RETURNING {FILE_COLUMNS}"
    ))
    .bind(id)
    .bind(author_id)
    .fetch_optional(pool)
    .await
}

/// Attach files of `author_id` to a message
pub async fn link_attachments<'e>(
    executor: impl PgExecutor<'e>,
    message_id: Uuid,
    author_id: Uuid,
    file_ids: &[Uuid],
) -> Result<u64, sqlx::Error> {
    if file_ids.is_empty() {
        return Ok(0);
    }
    let result = sqlx::query(
        "UPDATE files SET message_id = $1 WHERE id = ANY($2) AND author_id = $3 AND message_id IS NULL",
    )
    .bind(message_id)
    .bind(file_ids)
    .bind(author_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Files of the given messages, oldest first
pub async fn attachments_for(pool: &PgPool, message_ids: &[Uuid]) -> Result<Vec<FileRecord>, sqlx::Error> {
    if message_ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, FileRecord>(&format!(
        "SELECT {FILE_COLUMNS} FROM files WHERE message_id = ANY($1) ORDER BY created_at, id"
    ))
    .bind(message_ids)
    .fetch_all(pool)
    .await
}
