/**
 * Database Operations for Chats and Messages
 *
 * Chats, their members and their messages. Reads come back as the shared
 * wire types: a `Chat` carries its member profiles and a `Message` carries
 * its author profile and attachments.
 */

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::backend::files::db::{attachments_for, link_attachments, FileRecord};
use crate::shared::{Attachment, Chat, Message, Profile};

#[derive(Debug, Clone, sqlx::FromRow)]
struct ChatRow {
    id: Uuid,
    name: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct MemberRow {
    chat_id: Uuid,
    id: Uuid,
    name: String,
    username: String,
    avatar_url: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_username: String,
    pub author_avatar_url: Option<String>,
}

const MESSAGE_SELECT: &str = r#"
    SELECT m.id, m.chat_id, m.text, m.created_at, m.updated_at,
           u.id AS author_id, u.name AS author_name, u.username AS author_username,
           u.avatar_url AS author_avatar_url
    FROM messages m
    JOIN users u ON u.id = m.author_id
"#;

/// Attach member profiles to chat rows, keeping the row order
fn assemble_chats(rows: Vec<ChatRow>, members: Vec<MemberRow>) -> Vec<Chat> {
    let mut by_chat: HashMap<Uuid, Vec<Profile>> = HashMap::new();
    for member in members {
        by_chat.entry(member.chat_id).or_default().push(Profile {
            id: member.id,
            name: member.name,
            username: member.username,
            avatar_url: member.avatar_url,
        });
    }

    rows.into_iter()
        .map(|row| Chat {
            members: by_chat.remove(&row.id).unwrap_or_default(),
            id: row.id,
            name: row.name,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect()
}

/// Attach author profiles and attachments to message rows, keeping the row order
pub(crate) fn assemble_messages(rows: Vec<MessageRow>, files: Vec<FileRecord>) -> Vec<Message> {
    let mut by_message: HashMap<Uuid, Vec<Attachment>> = HashMap::new();
    for file in &files {
        if let Some(message_id) = file.message_id {
            by_message.entry(message_id).or_default().push(Attachment::from(file));
        }
    }

    rows.into_iter()
        .map(|row| Message {
            attachments: by_message.remove(&row.id).unwrap_or_default(),
            id: row.id,
            text: row.text,
            author: Profile {
                id: row.author_id,
                name: row.author_name,
                username: row.author_username,
                avatar_url: row.author_avatar_url,
            },
            chat_id: row.chat_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect()
}

async fn members_of(pool: &PgPool, chat_ids: &[Uuid]) -> Result<Vec<MemberRow>, sqlx::Error> {
    sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT cm.chat_id, u.id, u.name, u.username, u.avatar_url
        FROM chat_members cm
        JOIN users u ON u.id = cm.user_id
        WHERE cm.chat_id = ANY($1)
        ORDER BY u.name, u.id
        "#,
    )
    .bind(chat_ids)
    .fetch_all(pool)
    .await
}

async fn with_messages(pool: &PgPool, rows: Vec<MessageRow>) -> Result<Vec<Message>, sqlx::Error> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let files = attachments_for(pool, &ids).await?;
    Ok(assemble_messages(rows, files))
}

pub async fn is_member(pool: &PgPool, chat_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM chat_members WHERE chat_id = $1 AND user_id = $2)",
    )
    .bind(chat_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

/// Chats of a user, most recently active first
pub async fn list_chats(pool: &PgPool, user_id: Uuid) -> Result<Vec<Chat>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ChatRow>(
        r#"
        SELECT c.id, c.name, c.avatar_url, c.created_at, c.updated_at
        FROM chats c
        JOIN chat_members cm ON cm.chat_id = c.id
        WHERE cm.user_id = $1
        ORDER BY c.updated_at DESC, c.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let members = members_of(pool, &ids).await?;
    Ok(assemble_chats(rows, members))
}

/// A chat as seen by one of its members; `None` for anyone else
pub async fn get_chat(pool: &PgPool, chat_id: Uuid, user_id: Uuid) -> Result<Option<Chat>, sqlx::Error> {
    let row = sqlx::query_as::<_, ChatRow>(
        r#"
        SELECT c.id, c.name, c.avatar_url, c.created_at, c.updated_at
        FROM chats c
        JOIN chat_members cm ON cm.chat_id = c.id
        WHERE c.id = $1 AND cm.user_id = $2
        "#,
    )
    .bind(chat_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let members = members_of(pool, &[row.id]).await?;
    Ok(assemble_chats(vec![row], members).pop())
}

/// Create a chat with the given members
pub async fn create_chat(pool: &PgPool, name: Option<&str>, member_ids: &[Uuid]) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO chats (id, name, created_at, updated_at) VALUES ($1, $2, $3, $3)")
        .bind(id)
        .bind(name)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO chat_members (chat_id, user_id) SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
    )
    .bind(id)
    .bind(member_ids)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(id)
}

pub async fn rename_chat(pool: &PgPool, chat_id: Uuid, name: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE chats SET name = $2, updated_at = NOW() WHERE id = $1")
        .bind(chat_id)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Mark a chat as active at `at`
pub async fn touch_chat<'e>(executor: impl PgExecutor<'e>, chat_id: Uuid, at: DateTime<Utc>) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE chats SET updated_at = $2 WHERE id = $1")
        .bind(chat_id)
        .bind(at)
        .execute(executor)
        .await?;
    Ok(())
}

/// What leaving a chat did to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Too few members remained, the chat is gone
    Deleted,
    /// The user was removed, the others stay
    Left,
}

/// Remove `user_id` from a chat, deleting the chat when fewer than two
/// members would remain. `None` when the user is not a member.
///
/// The chat row is locked first so concurrent leaves are decided one at a time.
pub async fn leave_chat(pool: &PgPool, chat_id: Uuid, user_id: Uuid) -> Result<Option<LeaveOutcome>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM chats WHERE id = $1 FOR UPDATE")
        .bind(chat_id)
        .fetch_optional(&mut *tx)
        .await?;
    if locked.is_none() {
        return Ok(None);
    }

    let (members, is_member) = sqlx::query_as::<_, (i64, bool)>(
        "SELECT COUNT(*), COALESCE(BOOL_OR(user_id = $2), FALSE) FROM chat_members WHERE chat_id = $1",
    )
    .bind(chat_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;
    if !is_member {
        return Ok(None);
    }

    let outcome = if members <= 2 {
        sqlx::query("DELETE FROM chats WHERE id = $1")
            .bind(chat_id)
            .execute(&mut *tx)
            .await?;
        LeaveOutcome::Deleted
    } else {
        sqlx::query("DELETE FROM chat_members WHERE chat_id = $1 AND user_id = $2")
            .bind(chat_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        touch_chat(&mut *tx, chat_id, Utc::now()).await?;
        LeaveOutcome::Left
    };

    tx.commit().await?;
    Ok(Some(outcome))
}

/// One page of history: skip the `from` newest messages, take `take`, oldest first
pub async fn list_messages(pool: &PgPool, chat_id: Uuid, from: usize, take: usize) -> Result<Vec<Message>, sqlx::Error> {
    let mut rows = sqlx::query_as::<_, MessageRow>(&format!(
        "{MESSAGE_SELECT} WHERE m.chat_id = $1 ORDER BY m.created_at DESC, m.id DESC OFFSET $2 LIMIT $3"
    ))
    .bind(chat_id)
    .bind(i64::try_from(from).unwrap_or(i64::MAX))
    .bind(i64::try_from(take).unwrap_or(i64::MAX))
    .fetch_all(pool)
    .await?;
    rows.reverse();

    with_messages(pool, rows).await
}

pub async fn get_message(pool: &PgPool, message_id: Uuid) -> Result<Option<Message>, sqlx::Error> {
    let row = sqlx::query_as::<_, MessageRow>(&format!("{MESSAGE_SELECT} WHERE m.id = $1"))
        .bind(message_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(with_messages(pool, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

/// Store a message, link its attachments and touch the chat in one transaction
pub async fn insert_message(
    pool: &PgPool,
    chat_id: Uuid,
    author_id: Uuid,
    text: Option<&str>,
    file_ids: &[Uuid],
) -> Result<Option<Message>, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO messages (id, chat_id, author_id, text, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        "#,
    )
    .bind(id)
    .bind(chat_id)
    .bind(author_id)
    .bind(text)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    link_attachments(&mut *tx, id, author_id, file_ids).await?;
    touch_chat(&mut *tx, chat_id, now).await?;
    tx.commit().await?;

    get_message(pool, id).await
}

/// Replace the text of a message written by `author_id` in `chat_id`
pub async fn update_message(
    pool: &PgPool,
    chat_id: Uuid,
    message_id: Uuid,
    author_id: Uuid,
    text: &str,
) -> Result<Option<Message>, sqlx::Error> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE messages SET text = $4, updated_at = $5 WHERE id = $1 AND chat_id = $2 AND author_id = $3",
    )
    .bind(message_id)
    .bind(chat_id)
    .bind(author_id)
    .bind(text)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    touch_chat(&mut *tx, chat_id, now).await?;
    tx.commit().await?;

    get_message(pool, message_id).await
}

/// Delete a message written by `author_id` in `chat_id`
///
/// Returns the message as it was. Attachment rows go with it.
pub async fn delete_message(
    pool: &PgPool,
    chat_id: Uuid,
    message_id: Uuid,
    author_id: Uuid,
) -> Result<Option<Message>, sqlx::Error> {
    let Some(message) = get_message(pool, message_id).await? else {
        return Ok(None);
    };
    if message.chat_id != chat_id || message.author.id != author_id {
        return Ok(None);
    }

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM messages WHERE id = $1 AND chat_id = $2 AND author_id = $3")
        .bind(message_id)
        .bind(chat_id)
        .bind(author_id)
        .execute(&mut *tx)
        .await?;
    touch_chat(&mut *tx, chat_id, Utc::now()).await?;
    tx.commit().await?;

    Ok(Some(message))
}
