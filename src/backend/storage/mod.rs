/**
 * Object Storage
 *
 * Talks to an S3-compatible bucket through presigned URLs only: clients
 * upload with a signed PUT, the server deletes with a signed DELETE, and
 * public reads go through the CDN.
 *
 * URLs are path-style (`{endpoint}/{bucket}/{key}`) and signed with AWS
 * Signature Version 4 in the query string with an unsigned payload.
 */

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};

use crate::backend::error::{BackendError, BackendResult};
use crate::shared::AppConfig;

type HmacSha256 = Hmac<Sha256>;

/// Characters left as-is by SigV4 URI encoding
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');
/// Same, keeping path separators
const PATH: &AsciiSet = &UNRESERVED.remove(b'/');

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

#[derive(Debug, Clone)]
pub struct ObjectStore {
    endpoint: reqwest::Url,
    bucket: String,
    region: String,
    access_key: String,
    secret_key: String,
    cdn: String,
    http: reqwest::Client,
}

/// What a signature covers
struct SigningRequest<'a> {
    method: &'a str,
    host: &'a str,
    path: &'a str,
    content_type: Option<&'a str>,
    expires: u64,
    now: DateTime<Utc>,
}

fn hmac(key: &[u8], data: &str) -> BackendResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| BackendError::storage(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

/// SigV4 query string, `X-Amz-Signature` last
fn signed_query(access_key: &str, secret_key: &str, region: &str, request: &SigningRequest<'_>) -> BackendResult<String> {
    let amz_date = request.now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = request.now.format("%Y%m%d").to_string();
    let scope = format!("{date}/{region}/s3/aws4_request");

    let mut headers = Vec::new();
    if let Some(content_type) = request.content_type {
        headers.push(("content-type", content_type.trim()));
    }
    headers.push(("host", request.host));
    let signed_headers = headers.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(";");
    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();

    let query = [
        ("X-Amz-Algorithm", ALGORITHM.to_string()),
        ("X-Amz-Credential", format!("{access_key}/{scope}")),
        ("X-Amz-Date", amz_date.clone()),
        ("X-Amz-Expires", request.expires.to_string()),
        ("X-Amz-SignedHeaders", signed_headers.clone()),
    ]
    .iter()
    .map(|(name, value)| format!("{}={}", encode(name), encode(value)))
    .collect::<Vec<_>>()
    .join("&");

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\nUNSIGNED-PAYLOAD",
        request.method,
        utf8_percent_encode(request.path, PATH),
        query,
        canonical_headers,
        signed_headers,
    );
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let key = hmac(format!("AWS4{secret_key}").as_bytes(), &date)?;
    let key = hmac(&key, region)?;
    let key = hmac(&key, "s3")?;
    let key = hmac(&key, "aws4_request")?;
    let signature = hex::encode(hmac(&key, &string_to_sign)?);

    Ok(format!("{query}&X-Amz-Signature={signature}"))
}

impl ObjectStore {
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> BackendResult<Self> {
        let storage = &config.storage;
        let endpoint = reqwest::Url::parse(&storage.endpoint)
            .map_err(|e| BackendError::storage(format!("invalid storage endpoint: {e}")))?;

        Ok(Self {
            endpoint,
            bucket: storage.bucket.clone(),
            region: storage.region.clone(),
            access_key: storage.access_key.clone(),
            secret_key: storage.secret_key.clone(),
            cdn: config.urls.cdn.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn host(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or_default();
        match self.endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    fn object_path(&self, key: &str) -> String {
        let base = self.endpoint.path().trim_end_matches('/');
        format!("{base}/{}/{}", self.bucket, key.trim_start_matches('/'))
    }

    /// Presigned URL for `method` on `key`, valid for `expires` seconds from `now`
    pub fn presign(
        &self,
        method: &str,
        key: &str,
        content_type: Option<&str>,
        expires: u64,
        now: DateTime<Utc>,
    ) -> BackendResult<String> {
        let host = self.host();
        let path = self.object_path(key);
        let query = signed_query(
            &self.access_key,
            &self.secret_key,
            &self.region,
            &SigningRequest {
                method,
                host: &host,
                path: &path,
                content_type,
                expires,
                now,
            },
        )?;

        Ok(format!(
            "{}://{}{}?{}",
            self.endpoint.scheme(),
            host,
            utf8_percent_encode(&path, PATH),
            query
        ))
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.cdn, key.trim_start_matches('/'))
    }

    /// Object key behind a public CDN URL
    pub fn key_of(&self, public_url: &str) -> Option<String> {
        public_url
            .strip_prefix(&self.cdn)
            .map(|rest| rest.trim_start_matches('/').to_string())
            .filter(|key| !key.is_empty())
    }

    /// Delete an object; a missing object counts as deleted
    pub async fn delete_object(&self, key: &str) -> BackendResult<()> {
        let url = self.presign("DELETE", key, None, 60, Utc::now())?;
        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| BackendError::storage(e.to_string()))?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("Deleted object {}", key);
            Ok(())
        } else {
            Err(BackendError::storage(format!("DELETE {key} returned {status}")))
        }
    }
}
