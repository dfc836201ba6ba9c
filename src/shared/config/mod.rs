//! Application configuration module
//!
//! `AppConfig` gathers every tunable of the service: credential lifetimes,
//! paging sizes, public URLs and the connection settings of the database,
//! cache, mail relay, object store and Google OAuth.
//!
//! Values come from three layers, later layers winning:
//!
//! 1. Built-in defaults (`AppConfig::default()`)
//! 2. An optional TOML file named by `NORDAUN_CONFIG`
//! 3. Environment variables (`JWT_SECRET`, `DATABASE_URL`, ...)
//!
//! All durations are expressed in seconds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Lifetimes and windows, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Durations {
    /// Time-to-live of cached users and profiles
    pub cache: u64,
    /// Minimum time between two e-mail migrations
    pub email_change: u64,
    /// Session credential lifetime
    pub session: u64,
    /// License credential lifetime
    pub license: u64,
    /// Validity of signed upload URLs
    pub upload: u64,
    /// Rate limit window
    pub rate_limit: u64,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            cache: 60 * 10,
            email_change: 60 * 60 * 24 * 3,
            session: 60 * 60 * 24 * 30,
            license: 60 * 10,
            upload: 10,
            rate_limit: 100,
        }
    }
}

/// Size limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lengths {
    /// Number of digits of a one-time password
    pub otp: usize,
    /// Messages per history page
    pub message_chunk: usize,
    /// Longest message text accepted without attachments
    pub message_length: usize,
    /// Requests allowed per rate limit window
    pub rate_limit: u64,
    /// Attachments per message
    pub attachments: usize,
    /// Largest attachment, in bytes
    pub attachment_size: u64,
    /// Largest avatar, in bytes
    pub avatar_size: u64,
}

impl Default for Lengths {
    fn default() -> Self {
        Self {
            otp: 6,
            message_chunk: 20,
            message_length: 20,
            rate_limit: 60,
            attachments: 10,
            attachment_size: 25 * 1024 * 1024,
            avatar_size: 1024 * 1024,
        }
    }
}

/// Public base URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Urls {
    /// Where the application is served
    pub main: String,
    /// Where uploaded objects are publicly readable
    pub cdn: String,
}

impl Default for Urls {
    fn default() -> Self {
        Self {
            main: "http://localhost:3000".to_string(),
            cdn: "https://cdn.nordaun.com".to_string(),
        }
    }
}

/// HTTP listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// SMTP relay. Without a host, mail is kept in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 587,
            username: None,
            password: None,
            from: "Nordaun <no-reply@nordaun.com>".to_string(),
        }
    }
}

/// S3-compatible object store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9000".to_string(),
            bucket: "nordaun".to_string(),
            region: "auto".to_string(),
            access_key: String::new(),
            secret_key: String::new(),
        }
    }
}

/// Google OAuth client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Product name used in mails
    pub name: String,
    pub environment: Environment,
    /// HS256 secret shared by sessions and licenses
    pub jwt_secret: String,
    /// bcrypt work factor for passwords and one-time passwords
    pub bcrypt_cost: u32,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub server: ServerConfig,
    pub durations: Durations,
    pub lengths: Lengths,
    pub urls: Urls,
    pub mail: MailConfig,
    pub storage: StorageConfig,
    pub google: GoogleConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Nordaun".to_string(),
            environment: Environment::Development,
            jwt_secret: String::new(),
            bcrypt_cost: 12,
            database_url: None,
            redis_url: None,
            server: ServerConfig::default(),
            durations: Durations::default(),
            lengths: Lengths::default(),
            urls: Urls::default(),
            mail: MailConfig::default(),
            storage: StorageConfig::default(),
            google: GoogleConfig::default(),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load defaults, the optional `NORDAUN_CONFIG` file, then environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("NORDAUN_CONFIG") {
            Ok(path) => {
                let source = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::Io(format!("{}: {}", path, e)))?;
                Self::from_toml_str(&source)?
            }
            Err(_) => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        fn var(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|v| !v.trim().is_empty())
        }

        if let Some(v) = var("APP_ENV") {
            self.environment = match v.to_lowercase().as_str() {
                "production" | "prod" => Environment::Production,
                "test" => Environment::Test,
                "development" | "dev" => Environment::Development,
                _ => return Err(ConfigError::InvalidValue("APP_ENV", v)),
            };
        }
        if let Some(v) = var("JWT_SECRET") {
            self.jwt_secret = v;
        }
        if let Some(v) = var("DATABASE_URL") {
            self.database_url = Some(v);
        }
        if let Some(v) = var("REDIS_URL") {
            self.redis_url = Some(v);
        }
        if let Some(v) = var("SERVER_PORT") {
            self.server.port = v
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT", v))?;
        }
        if let Some(v) = var("MAIN_URL") {
            self.urls.main = v;
        }
        if let Some(v) = var("CDN_URL") {
            self.urls.cdn = v;
        }
        if let Some(v) = var("SMTP_HOST") {
            self.mail.host = Some(v);
        }
        if let Some(v) = var("SMTP_USER") {
            self.mail.username = Some(v);
        }
        if let Some(v) = var("SMTP_PASSWORD") {
            self.mail.password = Some(v);
        }
        if let Some(v) = var("MAIL_FROM") {
            self.mail.from = v;
        }
        if let Some(v) = var("STORAGE_ENDPOINT") {
            self.storage.endpoint = v;
        }
        if let Some(v) = var("STORAGE_BUCKET") {
            self.storage.bucket = v;
        }
        if let Some(v) = var("STORAGE_REGION") {
            self.storage.region = v;
        }
        if let Some(v) = var("STORAGE_ACCESS_KEY") {
            self.storage.access_key = v;
        }
        if let Some(v) = var("STORAGE_SECRET_KEY") {
            self.storage.secret_key = v;
        }
        if let Some(v) = var("GOOGLE_CLIENT_ID") {
            self.google.client_id = v;
        }
        if let Some(v) = var("GOOGLE_CLIENT_SECRET") {
            self.google.client_secret = v;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("jwt_secret"));
        }
        if self.environment.is_production() && self.jwt_secret.len() < 32 {
            return Err(ConfigError::InvalidValue(
                "jwt_secret",
                "must be at least 32 bytes in production".to_string(),
            ));
        }
        if self.lengths.otp == 0 || self.lengths.otp > 9 {
            return Err(ConfigError::InvalidValue("lengths.otp", self.lengths.otp.to_string()));
        }
        if self.lengths.message_chunk == 0 {
            return Err(ConfigError::InvalidValue("lengths.message_chunk", "0".to_string()));
        }
        if self.lengths.rate_limit == 0 || self.durations.rate_limit == 0 {
            return Err(ConfigError::InvalidValue("rate_limit", "0".to_string()));
        }
        for (key, url) in [("urls.main", &self.urls.main), ("urls.cdn", &self.urls.cdn)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(format!("{}={}", key, url)));
            }
        }
        Ok(())
    }

    /// Redirect URI registered with Google
    pub fn google_redirect_uri(&self) -> String {
        format!("{}/api/auth/google", self.urls.main.trim_end_matches('/'))
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt_secret = secret.into();
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.config.redis_url = Some(url.into());
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.config.bcrypt_cost = cost;
        self
    }

    pub fn main_url(mut self, url: impl Into<String>) -> Self {
        self.config.urls.main = url.into();
        self
    }

    pub fn cdn_url(mut self, url: impl Into<String>) -> Self {
        self.config.urls.cdn = url.into();
        self
    }

    pub fn otp_length(mut self, len: usize) -> Self {
        self.config.lengths.otp = len;
        self
    }

    pub fn message_chunk(mut self, chunk: usize) -> Self {
        self.config.lengths.message_chunk = chunk;
        self
    }

    pub fn message_length(mut self, len: usize) -> Self {
        self.config.lengths.message_length = len;
        self
    }

    /// Requests allowed per window of `window_secs`
    pub fn rate_limit(mut self, limit: u64, window_secs: u64) -> Self {
        self.config.lengths.rate_limit = limit;
        self.config.durations.rate_limit = window_secs;
        self
    }

    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    pub fn google(mut self, google: GoogleConfig) -> Self {
        self.config.google = google;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("failed to read configuration: {0}")]
    Io(String),
}
