/**
 * Licenses
 *
 * A license is a short-lived credential that unlocks exactly one sensitive
 * flow (its target). It is issued unsigned when the OTP mail goes out and
 * re-issued signed once the OTP has been confirmed.
 */

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::auth::tokens::{bearer, credential_cookie, decrypt, encrypt, now_secs, removal_cookie};
use crate::backend::error::BackendResult;
use crate::shared::{AppConfig, LicensedRoute};

pub const COOKIE_NAME: &str = "license";
pub const HEADER_NAME: &str = "License";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseClaims {
    pub sub: Uuid,
    pub target: LicensedRoute,
    pub signed: bool,
    pub iat: u64,
    pub exp: u64,
}

/// A verified license
#[derive(Debug, Clone, PartialEq)]
pub struct License {
    pub token: String,
    pub user_id: Uuid,
    pub target: LicensedRoute,
    pub signed: bool,
    pub expires_at: u64,
}

impl License {
    /// Whether this license authorises a signed `target` flow
    pub fn grants(&self, target: LicensedRoute) -> bool {
        self.signed && self.target == target
    }
}

fn issue(
    config: &AppConfig,
    jar: CookieJar,
    user_id: Uuid,
    target: LicensedRoute,
    signed: bool,
) -> BackendResult<(CookieJar, License)> {
    let iat = now_secs();
    let exp = iat + config.durations.license;
    let claims = LicenseClaims {
        sub: user_id,
        target,
        signed,
        iat,
        exp,
    };
    let token = encrypt(&config.jwt_secret, &claims)?;
    let jar = jar.add(credential_cookie(config, COOKIE_NAME, token.clone(), config.durations.license));

    Ok((
        jar,
        License {
            token,
            user_id,
            target,
            signed,
            expires_at: exp,
        },
    ))
}

/// Issue an unsigned license for `target`
pub fn create_license(
    config: &AppConfig,
    jar: CookieJar,
    target: LicensedRoute,
    user_id: Uuid,
) -> BackendResult<(CookieJar, License)> {
    issue(config, jar, user_id, target, false)
}

/// Verify the license from the cookie, then the `License` header
pub fn verify_license(config: &AppConfig, jar: &CookieJar, headers: &HeaderMap) -> Option<License> {
    let token = jar
        .get(COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| bearer(headers, HEADER_NAME))?;

    let claims: LicenseClaims = decrypt(&config.jwt_secret, &token)?;
    Some(License {
        token,
        user_id: claims.sub,
        target: claims.target,
        signed: claims.signed,
        expires_at: claims.exp,
    })
}

/// Re-issue the current license for the same user and target, signed
pub fn sign_license(
    config: &AppConfig,
    jar: CookieJar,
    headers: &HeaderMap,
) -> BackendResult<(CookieJar, Option<License>)> {
    match verify_license(config, &jar, headers) {
        Some(current) => {
            let (jar, license) = issue(config, jar, current.user_id, current.target, true)?;
            Ok((jar, Some(license)))
        }
        None => Ok((jar, None)),
    }
}

pub fn delete_license(config: &AppConfig, jar: CookieJar, headers: &HeaderMap) -> (CookieJar, Option<License>) {
    match verify_license(config, &jar, headers) {
        Some(license) => (jar.remove(removal_cookie(COOKIE_NAME)), Some(license)),
        None => (jar, None),
    }
}
