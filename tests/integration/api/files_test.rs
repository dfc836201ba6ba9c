//! Attachment and avatar integration tests

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;

use crate::common::{
    create_mock_store, create_test_user, deleted_objects, send, test_app, test_config, test_pool, test_state_with,
    with_mock_store,
};

#[tokio::test]
#[serial]
async fn test_attachments_are_signed_in_order_and_deleted_with_message() {
    let Some(pool) = test_pool().await else { return };
    let store = create_mock_store().await;
    let state = test_state_with(with_mock_store(test_config(), &store), Some(pool.clone()));
    let app = test_app(&state);
    let anna = create_test_user(&pool, &state.config, "anna").await;
    let ben = create_test_user(&pool, &state.config, "ben").await;

    let (_, chat) = send(&app, Method::POST, "/api/chats", Some(&anna.session), Some(json!({ "usernames": ["ben"] }))).await;
    let chat_id = chat["id"].as_str().expect("chat id");

    let (status, sent) = send(
        &app,
        Method::POST,
        &format!("/api/chat/{chat_id}/messages"),
        Some(&anna.session),
        Some(json!({
            "files": [
                { "name": "notes.pdf", "size": 2048, "type": "application/pdf" },
                { "name": "photo.png", "size": 1024, "type": "image/png" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{sent}");

    let uploads = sent["uploads"].as_array().expect("uploads");
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0]["attachment"]["name"], "notes.pdf");
    assert_eq!(uploads[1]["attachment"]["name"], "photo.png");
    for upload in uploads {
        let signed = upload["signedUrl"].as_str().expect("signed url");
        assert!(signed.starts_with(&store.uri()));
        assert!(signed.contains("X-Amz-Signature="));
        assert!(upload["publicUrl"].as_str().is_some_and(|u| u.contains("/attachments/")));
    }
    assert_eq!(sent["message"]["attachments"].as_array().map(Vec::len), Some(2));
    assert!(sent["message"]["text"].is_null());

    let (_, history) = send(&app, Method::GET, &format!("/api/chat/{chat_id}/messages"), Some(&ben.session), None).await;
    let stored: Vec<_> = history[0]["attachments"]
        .as_array()
        .expect("attachments")
        .iter()
        .map(|a| a["name"].clone())
        .collect();
    assert_eq!(stored, [json!("notes.pdf"), json!("photo.png")]);

    let message_id = sent["message"]["id"].as_str().expect("message id");
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/chat/{chat_id}/messages/{message_id}"),
        Some(&anna.session),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted_objects(&store).await, 2);

    let (_, history) = send(&app, Method::GET, &format!("/api/chat/{chat_id}/messages"), Some(&ben.session), None).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
#[serial]
async fn test_avatar_replaces_previous_file() {
    let Some(pool) = test_pool().await else { return };
    let store = create_mock_store().await;
    let state = test_state_with(with_mock_store(test_config(), &store), Some(pool.clone()));
    let app = test_app(&state);
    let anna = create_test_user(&pool, &state.config, "anna").await;
    let avatar = json!({ "name": "me.png", "size": 4096, "type": "image/png" });

    let (status, first) = send(&app, Method::POST, "/api/files/avatar", Some(&anna.session), Some(avatar.clone())).await;
    assert_eq!(status, StatusCode::OK, "{first}");
    let (_, me) = send(&app, Method::GET, "/api/auth/me", Some(&anna.session), None).await;
    assert_eq!(me["avatarUrl"], first["publicUrl"]);

    let (status, second) = send(&app, Method::POST, "/api/files/avatar", Some(&anna.session), Some(avatar)).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(first["publicUrl"], second["publicUrl"]);
    assert_eq!(deleted_objects(&store).await, 1);

    let first_id = first["attachment"]["id"].as_str().expect("file id");
    let (status, body) = send(&app, Method::DELETE, &format!("/api/files/{first_id}"), Some(&anna.session), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "fileNotFound");
}

#[tokio::test]
#[serial]
async fn test_rejected_avatar_keeps_current_one() {
    let Some(pool) = test_pool().await else { return };
    let store = create_mock_store().await;
    let state = test_state_with(with_mock_store(test_config(), &store), Some(pool.clone()));
    let app = test_app(&state);
    let anna = create_test_user(&pool, &state.config, "anna").await;

    let avatar = json!({ "name": "me.png", "size": 4096, "type": "image/png" });
    let (status, current) = send(&app, Method::POST, "/api/files/avatar", Some(&anna.session), Some(avatar)).await;
    assert_eq!(status, StatusCode::OK, "{current}");

    let rejected = json!({ "name": "cv.pdf", "size": 4096, "type": "application/pdf" });
    let (status, _) = send(&app, Method::POST, "/api/files/avatar", Some(&anna.session), Some(rejected)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(deleted_objects(&store).await, 0);
    let (_, me) = send(&app, Method::GET, "/api/auth/me", Some(&anna.session), None).await;
    assert_eq!(me["avatarUrl"], current["publicUrl"]);
}
