//! HTTP API Client
//!
//! Typed calls against the backend used by the chat store and the upload
//! queue. The session token is sent as `Authorization: Bearer <token>`.

use bytes::Bytes;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::chat::{SendMessageRequest, SendMessageResponse};
use crate::shared::{Chat, FlowResponse, FormErrors, Message};

/// Errors of the HTTP client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with an error body
    #[error("Request failed with {status}: {error}")]
    Api {
        status: StatusCode,
        /// Message key, e.g. `chatNotFound`
        error: String,
        errors: Option<FormErrors>,
    },

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("{files} files but {urls} upload URLs")]
    UploadMismatch { files: usize, urls: usize },
}

impl ClientError {
    /// Message key to show, `unexpectedError` for transport failures
    pub fn key(&self) -> &str {
        match self {
            Self::Api { error, .. } => error,
            Self::Unauthenticated => "sessionInvalid",
            _ => "unexpectedError",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    errors: Option<FormErrors>,
}

/// Turn a non-success response into `ClientError::Api`
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let (error, errors) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.error, body.errors),
        Err(_) => (status.to_string(), None),
    };
    Err(ClientError::Api { status, error, errors })
}

/// Nordaun API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    session: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
            session: None,
        }
    }

    pub fn with_session(mut self, token: impl Into<String>) -> Self {
        self.session = Some(token.into());
        self
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Result<&str, ClientError> {
        self.session.as_deref().ok_or(ClientError::Unauthenticated)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Log in and keep the issued session
    ///
    /// With two-factor authentication on, the response redirects to
    /// `/confirm` and carries a license instead of a session.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<FlowResponse, ClientError> {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let flow: FlowResponse = check(response).await?.json().await?;

        if let Some(session) = &flow.session {
            self.session = Some(session.clone());
        }
        tracing::debug!("Login answered with redirect to {}", flow.redirect);
        Ok(flow)
    }

    pub async fn fetch_chat(&self, chat_id: Uuid) -> Result<Chat, ClientError> {
        self.get_json(&format!("/api/chat/{chat_id}")).await
    }

    /// One page of history starting after the `from` newest messages
    pub async fn load_messages(&self, chat_id: Uuid, from: usize) -> Result<Vec<Message>, ClientError> {
        self.get_json(&format!("/api/chat/{chat_id}/messages?from={from}")).await
    }

    pub async fn send_message(
        &self,
        chat_id: Uuid,
        request: &SendMessageRequest,
    ) -> Result<SendMessageResponse, ClientError> {
        let response = self
            .client
            .post(self.url(&format!("/api/chat/{chat_id}/messages")))
            .bearer_auth(self.token()?)
            .json(request)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// PUT a file body to a signed upload URL
    pub async fn put_signed(&self, signed_url: &str, content_type: &str, body: Bytes) -> Result<(), ClientError> {
        let response = self
            .client
            .put(signed_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::chat::fixtures;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_login_keeps_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({ "email": "anna@example.com", "password": "Secret123!" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "redirect": "/account",
                "session": "token-1"
            })))
            .mount(&server)
            .await;

        let mut client = ApiClient::new(server.uri());
        let flow = client.login("anna@example.com", "Secret123!").await.unwrap();
        assert_eq!(flow.redirect, "/account");
        assert_eq!(client.session(), Some("token-1"));
    }

    #[tokio::test]
    async fn test_error_body_is_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "error": "passwordInvalid",
                "status": 422,
                "errors": { "password": ["passwordInvalid"] }
            })))
            .mount(&server)
            .await;

        let err = ApiClient::new(server.uri())
            .login("anna@example.com", "nope")
            .await
            .unwrap_err();
        assert_eq!(err.key(), "passwordInvalid");
        match err {
            ClientError::Api { status, errors, .. } => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
                assert!(errors.unwrap().get("password").is_some());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_messages_sends_cursor_and_token() {
        let server = MockServer::start().await;
        let chat_id = Uuid::from_u128(999);
        let anna = fixtures::profile(1, "Anna Kovacs");
        let page = vec![fixtures::message(1, &anna, fixtures::at(1, 10, 0))];
        Mock::given(method("GET"))
            .and(path(format!("/api/chat/{chat_id}/messages")))
            .and(query_param("from", "20"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&page))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).with_session("token-1");
        let messages = client.load_messages(chat_id, 20).await.unwrap();
        assert_eq!(messages, page);
    }

    #[tokio::test]
    async fn test_requests_need_session() {
        let err = ApiClient::new("http://localhost:1")
            .fetch_chat(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Unauthenticated));
    }
}
