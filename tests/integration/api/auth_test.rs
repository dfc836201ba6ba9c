//! Authentication API integration tests
//!
//! Signup, login, the OTP step-up and the licensed account flows.

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;

use crate::common::{
    create_test_user, last_otp, send, send_licensed, test_app, test_pool, test_state, TEST_PASSWORD,
};

#[tokio::test]
async fn test_signup_without_database() {
    let state = test_state(None);
    let (status, body) = send(
        &test_app(&state),
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "name": "Anna Berg", "email": "anna@example.com", "username": "anna", "password": "Password1" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "serviceUnavailable");
}

#[tokio::test]
async fn test_me_without_session() {
    let state = test_state(None);
    let (status, body) = send(&test_app(&state), Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_logout_always_redirects() {
    let state = test_state(None);
    let (status, body) = send(&test_app(&state), Method::POST, "/api/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/login");
}

#[tokio::test]
#[serial]
async fn test_signup_and_me() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(Some(pool));
    let app = test_app(&state);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "name": "Anna Berg", "email": " anna@example.com ", "username": "anna", "password": "Password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/account");
    let session = body["session"].as_str().expect("session issued").to_string();

    let (status, me) = send(&app, Method::GET, "/api/auth/me", Some(&session), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "anna@example.com");
    assert_eq!(me["username"], "anna");
    assert!(me.get("password").is_none());
}

#[tokio::test]
#[serial]
async fn test_signup_rejects_invalid_and_taken_fields() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(Some(pool.clone()));
    let app = test_app(&state);
    create_test_user(&pool, &state.config, "taken").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "name": "anna", "email": "nope", "username": "A!", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["email"][0], "emailInvalid");
    assert_eq!(body["errors"]["username"][0], "usernameShort");
    assert_eq!(body["errors"]["password"][0], "passwordShort");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "name": "Anna Berg", "email": "taken@example.com", "username": "anna", "password": "Password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "emailTaken");
}

#[tokio::test]
#[serial]
async fn test_login_with_wrong_password() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(Some(pool.clone()));
    let user = create_test_user(&pool, &state.config, "ben").await;

    let (status, body) = send(
        &test_app(&state),
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email, "password": "Wrong12345" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["password"][0], "passwordInvalid");
}

#[tokio::test]
#[serial]
async fn test_two_factor_login_requires_otp() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(Some(pool.clone()));
    let app = test_app(&state);
    let user = create_test_user(&pool, &state.config, "cora").await;

    let (status, body) = send(&app, Method::POST, "/api/auth/two-factor", Some(&user.session), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["twoFactorAuth"], true);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/confirm");
    assert!(body.get("session").is_none());
    let license = body["license"].as_str().expect("unsigned license").to_string();

    let (status, body) = send_licensed(&app, "/api/auth/confirm", &license, json!({ "otp": "000000" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(matches!(body["error"].as_str(), Some("otpInvalid" | "otpLength")));

    let otp = last_otp(&state.mailer, &user.email).expect("code mailed");
    let (status, body) = send_licensed(&app, "/api/auth/confirm", &license, json!({ "otp": otp })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/account");
    assert!(body["session"].is_string());

    // Codes are single use
    let (status, _) = send_licensed(&app, "/api/auth/confirm", &license, json!({ "otp": otp })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn test_reset_password_flow() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(Some(pool.clone()));
    let app = test_app(&state);
    let user = create_test_user(&pool, &state.config, "dan").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/verify/resetpassword",
        None,
        Some(json!({ "email": user.email })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/confirm");
    let unsigned = body["license"].as_str().expect("license").to_string();

    // An unsigned license does not unlock the flow
    let (status, _) = send_licensed(
        &app,
        "/api/auth/reset-password",
        &unsigned,
        json!({ "password": "NewPassword9", "passwordAgain": "NewPassword9" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let otp = last_otp(&state.mailer, &user.email).expect("code mailed");
    let (status, body) = send_licensed(&app, "/api/auth/confirm", &unsigned, json!({ "otp": otp })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/resetpassword");
    let signed = body["license"].as_str().expect("signed license").to_string();

    let (status, _) = send_licensed(
        &app,
        "/api/auth/reset-password",
        &signed,
        json!({ "password": "NewPassword9", "passwordAgain": "NewPassword9" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email, "password": "NewPassword9" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["session"].is_string());
}

#[tokio::test]
#[serial]
async fn test_verify_unknown_email() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(Some(pool));
    let (status, body) = send(
        &test_app(&state),
        Method::POST,
        "/api/auth/verify/terminateaccount",
        None,
        Some(json!({ "email": "ghost@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["email"][0], "emailNotFound");
}
