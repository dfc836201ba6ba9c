//! Chat API integration tests
//!
//! Membership, history paging and message ownership.

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use serial_test::serial;

use crate::common::{create_test_user, send, test_app, test_pool, test_state, TestUser};

async fn start_chat(app: &axum::Router, creator: &TestUser, others: &[&TestUser]) -> String {
    let usernames: Vec<&str> = others.iter().map(|u| u.username.as_str()).collect();
    let (status, chat) = send(
        app,
        Method::POST,
        "/api/chats",
        Some(&creator.session),
        Some(json!({ "usernames": usernames })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{chat}");
    chat["id"].as_str().expect("chat id").to_string()
}

fn texts(messages: &Value) -> Vec<String> {
    messages
        .as_array()
        .expect("message list")
        .iter()
        .map(|m| m["text"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_chats_need_session() {
    let state = test_state(None);
    let (status, _) = send(&test_app(&state), Method::GET, "/api/chats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn test_create_chat_rules() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(Some(pool.clone()));
    let app = test_app(&state);
    let anna = create_test_user(&pool, &state.config, "anna").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/chats",
        Some(&anna.session),
        Some(json!({ "usernames": ["anna"] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["usernames"][0], "membersInsufficient");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/chats",
        Some(&anna.session),
        Some(json!({ "usernames": ["nobody"] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["usernames"][0], "userNotFound");
}

#[tokio::test]
#[serial]
async fn test_chat_is_hidden_from_non_members() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(Some(pool.clone()));
    let app = test_app(&state);
    let anna = create_test_user(&pool, &state.config, "anna").await;
    let ben = create_test_user(&pool, &state.config, "ben").await;
    let eve = create_test_user(&pool, &state.config, "eve").await;

    let chat_id = start_chat(&app, &anna, &[&ben]).await;

    let (status, chat) = send(&app, Method::GET, &format!("/api/chat/{chat_id}"), Some(&ben.session), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chat["members"].as_array().map(Vec::len), Some(2));

    let (status, body) = send(&app, Method::GET, &format!("/api/chat/{chat_id}"), Some(&eve.session), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "chatNotFound");

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/chat/{chat_id}/messages"),
        Some(&eve.session),
        Some(json!({ "text": "let me in" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, chats) = send(&app, Method::GET, "/api/chats", Some(&eve.session), None).await;
    assert_eq!(chats, json!([]));
}

#[tokio::test]
#[serial]
async fn test_history_pages_oldest_first() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(Some(pool.clone()));
    let app = test_app(&state);
    let anna = create_test_user(&pool, &state.config, "anna").await;
    let ben = create_test_user(&pool, &state.config, "ben").await;
    let chat_id = start_chat(&app, &anna, &[&ben]).await;
    let uri = format!("/api/chat/{chat_id}/messages");

    for i in 0..7 {
        let (status, _) = send(&app, Method::POST, &uri, Some(&anna.session), Some(json!({ "text": format!("m{i}") }))).await;
        assert_eq!(status, StatusCode::OK);
    }

    // The chunk is five messages: the newest five first, then the rest
    let (status, latest) = send(&app, Method::GET, &uri, Some(&ben.session), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(texts(&latest), vec!["m2", "m3", "m4", "m5", "m6"]);

    let (_, older) = send(&app, Method::GET, &format!("{uri}?from=5"), Some(&ben.session), None).await;
    assert_eq!(texts(&older), vec!["m0", "m1"]);

    let (_, beyond) = send(&app, Method::GET, &format!("{uri}?from=7"), Some(&ben.session), None).await;
    assert_eq!(beyond, json!([]));
}

#[tokio::test]
#[serial]
async fn test_only_author_edits_and_deletes() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(Some(pool.clone()));
    let app = test_app(&state);
    let anna = create_test_user(&pool, &state.config, "anna").await;
    let ben = create_test_user(&pool, &state.config, "ben").await;
    let chat_id = start_chat(&app, &anna, &[&ben]).await;

    let (_, sent) = send(
        &app,
        Method::POST,
        &format!("/api/chat/{chat_id}/messages"),
        Some(&anna.session),
        Some(json!({ "text": "helo" })),
    )
    .await;
    let message_id = sent["message"]["id"].as_str().expect("message id").to_string();
    let uri = format!("/api/chat/{chat_id}/messages/{message_id}");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(&ben.session), Some(json!({ "text": "hijack" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "messageInvalid");

    let (status, edited) = send(&app, Method::PATCH, &uri, Some(&anna.session), Some(json!({ "text": "hello" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["text"], "hello");

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&ben.session), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, deleted) = send(&app, Method::DELETE, &uri, Some(&anna.session), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], message_id);

    let (_, history) = send(
        &app,
        Method::GET,
        &format!("/api/chat/{chat_id}/messages"),
        Some(&anna.session),
        None,
    )
    .await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
#[serial]
async fn test_rename_and_leave() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(Some(pool.clone()));
    let app = test_app(&state);
    let anna = create_test_user(&pool, &state.config, "anna").await;
    let ben = create_test_user(&pool, &state.config, "ben").await;
    let cora = create_test_user(&pool, &state.config, "cora").await;
    let chat_id = start_chat(&app, &anna, &[&ben, &cora]).await;
    let uri = format!("/api/chat/{chat_id}");

    let (status, renamed) = send(&app, Method::PATCH, &uri, Some(&ben.session), Some(json!({ "name": "Trip (2025)" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Trip (2025)");

    let (status, _) = send(&app, Method::DELETE, &format!("{uri}/members/me"), Some(&cora.session), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, chat) = send(&app, Method::GET, &uri, Some(&anna.session), None).await;
    assert_eq!(chat["members"].as_array().map(Vec::len), Some(2));

    // Two members left: leaving deletes the chat
    let (status, _) = send(&app, Method::DELETE, &format!("{uri}/members/me"), Some(&ben.session), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &uri, Some(&anna.session), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_concurrent_leaves_never_strand_a_member() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(Some(pool.clone()));
    let app = test_app(&state);
    let anna = create_test_user(&pool, &state.config, "anna").await;
    let ben = create_test_user(&pool, &state.config, "ben").await;
    let cora = create_test_user(&pool, &state.config, "cora").await;
    let dan = create_test_user(&pool, &state.config, "dan").await;
    let chat_id = start_chat(&app, &anna, &[&ben, &cora]).await;
    let leave = format!("/api/chat/{chat_id}/members/me");

    let (status, _) = send(&app, Method::DELETE, &leave, Some(&dan.session), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let ((first, _), (second, _)) = tokio::join!(
        send(&app, Method::DELETE, &leave, Some(&ben.session), None),
        send(&app, Method::DELETE, &leave, Some(&cora.session), None),
    );
    assert_eq!(first, StatusCode::NO_CONTENT);
    assert_eq!(second, StatusCode::NO_CONTENT);

    // One leave sees three members, the other sees two and removes the chat
    let id: uuid::Uuid = chat_id.parse().expect("chat uuid");
    let members: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_members WHERE chat_id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .expect("count members");
    assert_eq!(members, 0);
    let (status, _) = send(&app, Method::GET, &format!("/api/chat/{chat_id}"), Some(&anna.session), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
