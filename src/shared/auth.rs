/**
 * Authentication Types
 *
 * Types shared by the auth handlers and API clients: the routes a license
 * can unlock, the profile fields a user may personalize and the response
 * returned by every auth flow.
 */
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sensitive flow that can only be reached with a signed license
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicensedRoute {
    ResetPassword,
    TerminateAccount,
    TwoFactorAuth,
    MigrateEmail,
}

impl LicensedRoute {
    pub const ALL: [LicensedRoute; 4] = [
        LicensedRoute::ResetPassword,
        LicensedRoute::TerminateAccount,
        LicensedRoute::TwoFactorAuth,
        LicensedRoute::MigrateEmail,
    ];

    /// Target key carried in the license token and the `/verify/{target}` path
    pub fn target(&self) -> &'static str {
        match self {
            Self::ResetPassword => "resetpassword",
            Self::TerminateAccount => "terminateaccount",
            Self::TwoFactorAuth => "twofactorauth",
            Self::MigrateEmail => "migrateemail",
        }
    }

    /// Message key prefix of the route (mail subjects, page titles)
    pub fn name(&self) -> &'static str {
        match self {
            Self::ResetPassword => "resetPassword",
            Self::TerminateAccount => "terminateAccount",
            Self::TwoFactorAuth => "twoFactorAuth",
            Self::MigrateEmail => "migrateEmail",
        }
    }

    /// Page the user lands on once the license is signed
    pub fn href(&self) -> &'static str {
        match self {
            Self::ResetPassword => "/resetpassword",
            Self::TerminateAccount => "/terminateaccount",
            Self::TwoFactorAuth => "/account",
            Self::MigrateEmail => "/migrateemail",
        }
    }

    /// Hidden routes are left out of the route listings shown to users
    pub fn hidden(&self) -> bool {
        matches!(self, Self::TwoFactorAuth)
    }
}

impl fmt::Display for LicensedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target())
    }
}

impl FromStr for LicensedRoute {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|route| route.target() == s)
            .ok_or(())
    }
}

/// Profile field a signed-in user may change on their own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personalizable {
    Name,
    Phone,
    Username,
}

impl Personalizable {
    /// Column and form field name
    pub fn field(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Username => "username",
        }
    }
}

/// Result of an auth flow: where the client should go next, plus any
/// credential that was issued (also set as a cookie)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowResponse {
    pub redirect: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

impl FlowResponse {
    pub fn redirect(to: impl Into<String>) -> Self {
        Self {
            redirect: to.into(),
            session: None,
            license: None,
        }
    }

    pub fn with_session(mut self, token: String) -> Self {
        self.session = Some(token);
        self
    }

    pub fn with_license(mut self, token: String) -> Self {
        self.license = Some(token);
        self
    }
}
