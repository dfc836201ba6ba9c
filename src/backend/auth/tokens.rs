/**
 * Signed Tokens and Credential Cookies
 *
 * Sessions and licenses are both HS256 JWTs signed with the configured
 * secret. This module holds the parts they share: signing, verification,
 * bearer header lookup and the cookie attributes.
 */

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::shared::AppConfig;

/// Seconds since the Unix epoch
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Sign claims into an HS256 token
pub fn encrypt<T: Serialize>(secret: &str, claims: &T) -> Result<String, jsonwebtoken::errors::Error> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &key)
}

/// Verify a token and return its claims
///
/// Bad signatures, expired tokens and malformed input all yield `None`.
pub fn decrypt<T: DeserializeOwned>(secret: &str, token: &str) -> Option<T> {
    if token.is_empty() {
        return None;
    }
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    match decode::<T>(token, &key, &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!("Rejected token: {}", e);
            None
        }
    }
}

/// Token from a `<name>: Bearer <token>` header
pub fn bearer(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// HttpOnly, SameSite=Lax cookie scoped to `/`, Secure in production
pub fn credential_cookie(
    config: &AppConfig,
    name: &'static str,
    token: String,
    max_age_secs: u64,
) -> Cookie<'static> {
    Cookie::build((name, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(config.environment.is_production())
        .max_age(time::Duration::seconds(max_age_secs as i64))
        .build()
}

/// Cookie matching `credential_cookie` for removal from a jar
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Claims {
        sub: String,
        exp: u64,
    }

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    #[test]
    fn test_roundtrip() {
        let claims = Claims {
            sub: "u1".into(),
            exp: now_secs() + 60,
        };
        let token = encrypt(SECRET, &claims).unwrap();
        assert_eq!(decrypt::<Claims>(SECRET, &token), Some(claims));
    }

    #[test]
    fn test_rejects_other_secret_expired_and_garbage() {
        let claims = Claims {
            sub: "u1".into(),
            exp: now_secs() + 60,
        };
        let token = encrypt(SECRET, &claims).unwrap();
        assert_eq!(decrypt::<Claims>("another-secret", &token), None);

        let expired = Claims {
            sub: "u1".into(),
            exp: now_secs() - 3600,
        };
        let token = encrypt(SECRET, &expired).unwrap();
        assert_eq!(decrypt::<Claims>(SECRET, &token), None);

        assert_eq!(decrypt::<Claims>(SECRET, "not.a.token"), None);
        assert_eq!(decrypt::<Claims>(SECRET, ""), None);
    }

    #[test]
    fn test_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert("Session", HeaderValue::from_static("Bearer abc"));
        headers.insert("License", HeaderValue::from_static("abc"));
        assert_eq!(bearer(&headers, "Session"), Some("abc".to_string()));
        assert_eq!(bearer(&headers, "License"), None);
        assert_eq!(bearer(&headers, "Authorization"), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let config = AppConfig::builder()
            .jwt_secret(SECRET)
            .build()
            .unwrap();
        let cookie = credential_cookie(&config, "session", "t".into(), 60);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(60)));
    }
}
