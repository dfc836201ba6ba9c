/**
 * Authentication Handler Types
 *
 * Request bodies of the auth endpoints. Each one derives `Validate` with the
 * shared field rules, and is trimmed before validation.
 */

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::validation;

/// Trim every text field of a request body
pub trait Trimmed {
    fn trimmed(self) -> Self;
}

fn trim(value: String) -> String {
    value.trim().to_string()
}

/// Sign up request
#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct SignupRequest {
    #[validate(custom(function = "validation::name"))]
    pub name: String,
    #[validate(custom(function = "validation::email"))]
    pub email: String,
    #[validate(custom(function = "validation::username"))]
    pub username: String,
    #[validate(custom(function = "validation::password"))]
    pub password: String,
}

impl Trimmed for SignupRequest {
    fn trimmed(self) -> Self {
        Self {
            name: trim(self.name),
            email: trim(self.email),
            username: trim(self.username),
            password: trim(self.password),
        }
    }
}

/// Login request
#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = "validation::email"))]
    pub email: String,
    #[validate(custom(function = "validation::password"))]
    pub password: String,
}

impl Trimmed for LoginRequest {
    fn trimmed(self) -> Self {
        Self {
            email: trim(self.email),
            password: trim(self.password),
        }
    }
}

/// Body of `/verify/{target}` and the e-mail half of the migration form
#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct EmailRequest {
    #[validate(custom(function = "validation::email"))]
    pub email: String,
}

impl Trimmed for EmailRequest {
    fn trimmed(self) -> Self {
        Self {
            email: trim(self.email),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OtpRequest {
    pub otp: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: String,
    pub password_again: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MigrateEmailRequest {
    pub email: String,
    pub email_again: String,
}

/// Body of `/personalize/{field}`
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PersonalizeRequest {
    pub value: String,
}

/// Result of toggling two-factor authentication
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorResponse {
    pub two_factor_auth: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
}
