//! Object store mock for integration tests
//!
//! Stands in for the S3-compatible bucket so deletions the server performs
//! can be observed.

use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nordaun::shared::config::StorageConfig;
use nordaun::shared::AppConfig;

pub const TEST_BUCKET: &str = "nordaun-test";

/// Bucket mock answering every DELETE with 204
pub async fn create_mock_store() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path_regex(format!("^/{TEST_BUCKET}/.+")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    server
}

/// `config` pointed at the mock bucket
pub fn with_mock_store(mut config: AppConfig, server: &MockServer) -> AppConfig {
    config.storage = StorageConfig {
        endpoint: server.uri(),
        bucket: TEST_BUCKET.to_string(),
        region: "auto".to_string(),
        access_key: "AKIDEXAMPLE".to_string(),
        secret_key: "test-secret-key".to_string(),
    };
    config
}

/// Number of DELETE requests the mock received
pub async fn deleted_objects(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.method.as_str() == "DELETE")
        .count()
}
