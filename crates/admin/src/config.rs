//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `ADMIN_BASE_URL` - Public URL for the admin panel, when served behind a proxy
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_LOCALE` - Language for user-facing messages, `es` or `en` (default: es)
//! - `ADMIN_VIEW_FORMAT` - Fragment format, `html` or `json` (default: html)
//! - `ADMIN_NOTICE_KEY` - Key for signing redirect notices (default: random per process)
//! - `IMAGE_PLACEHOLDER_URL` - URL shown for products without an image
//! - `IMAGE_BLOB_BASE_URL` - Base URL of the product image blob container
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)
//!
//! ## Optional (TLS)
//! - `ADMIN_TLS_CERT` - PEM-encoded certificate chain
//! - `ADMIN_TLS_KEY` - PEM-encoded private key

use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

use shopping_core::ImageUrls;

use crate::i18n::Locale;
use crate::views::ViewFormat;

const DEFAULT_IMAGE_PLACEHOLDER_URL: &str = "/static/images/noimage.png";
const DEFAULT_IMAGE_BLOB_BASE_URL: &str = "/static/images/products";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel (set when a proxy terminates TLS)
    pub base_url: Option<String>,
    /// Language for notices, validation errors and constraint messages
    pub locale: Locale,
    /// Output format of rendered views
    pub view_format: ViewFormat,
    /// Product image URL templates
    pub images: ImageConfig,
    /// HMAC key for redirect notices; share it between instances behind a
    /// load balancer
    pub notice_key: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// Product image URL configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConfig {
    /// URL used for products without an uploaded image
    pub placeholder_url: String,
    /// Base URL of the blob container holding product images
    pub blob_base_url: String,
}

impl ImageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let placeholder_url =
            get_env_or_default("IMAGE_PLACEHOLDER_URL", DEFAULT_IMAGE_PLACEHOLDER_URL);
        let blob_base_url = get_env_or_default("IMAGE_BLOB_BASE_URL", DEFAULT_IMAGE_BLOB_BASE_URL);

        validate_url_or_path(&placeholder_url, "IMAGE_PLACEHOLDER_URL")?;
        validate_url_or_path(&blob_base_url, "IMAGE_BLOB_BASE_URL")?;

        Ok(Self {
            placeholder_url,
            blob_base_url,
        })
    }

    /// Build the URL resolver for product images.
    #[must_use]
    pub fn urls(&self) -> ImageUrls {
        ImageUrls::new(self.placeholder_url.clone(), self.blob_base_url.clone())
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            placeholder_url: DEFAULT_IMAGE_PLACEHOLDER_URL.to_string(),
            blob_base_url: DEFAULT_IMAGE_BLOB_BASE_URL.to_string(),
        }
    }
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let cert_pem = get_optional_env("ADMIN_TLS_CERT");
        let key_pem = get_optional_env("ADMIN_TLS_KEY");

        match (cert_pem, key_pem) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "ADMIN_TLS_*".to_string(),
                "Both ADMIN_TLS_CERT and ADMIN_TLS_KEY must be set together".to_string(),
            )),
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ADMIN_DATABASE_URL")?;
        let host: IpAddr = parse_env_or("ADMIN_HOST", "127.0.0.1")?;
        let port: u16 = parse_env_or("ADMIN_PORT", "3001")?;
        let base_url = get_optional_env("ADMIN_BASE_URL");
        if let Some(base_url) = &base_url {
            url::Url::parse(base_url).map_err(|e| {
                ConfigError::InvalidEnvVar("ADMIN_BASE_URL".to_string(), e.to_string())
            })?;
        }
        let locale: Locale = parse_env_or("ADMIN_LOCALE", "es")?;
        let view_format: ViewFormat = parse_env_or("ADMIN_VIEW_FORMAT", "html")?;
        let images = ImageConfig::from_env()?;
        let notice_key = get_optional_env("ADMIN_NOTICE_KEY").map(SecretString::from);
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = sample_rate("SENTRY_SAMPLE_RATE");
        let sentry_traces_sample_rate = sample_rate("SENTRY_TRACES_SAMPLE_RATE");
        let tls = TlsConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            locale,
            view_format,
            images,
            notice_key,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            tls,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the admin panel is served over HTTPS (controls secure cookies).
    ///
    /// Follows the scheme of `base_url` when set, otherwise whether this
    /// process terminates TLS itself.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url
            .as_deref()
            .map_or(self.tls.is_some(), |url| url.starts_with("https://"))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or `default`) with `FromStr`.
fn parse_env_or<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Sentry sample rate in `0.0..=1.0`; unset or unparsable means 1.0.
fn sample_rate(key: &str) -> f32 {
    get_optional_env(key)
        .and_then(|s| s.parse::<f32>().ok())
        .map_or(1.0, |rate| rate.clamp(0.0, 1.0))
}

/// Accept absolute URLs and site-relative paths (starting with `/`).
fn validate_url_or_path(value: &str, var_name: &str) -> Result<(), ConfigError> {
    if value.starts_with('/') {
        return Ok(());
    }
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> AdminConfig {
        AdminConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: None,
            locale: Locale::Es,
            view_format: ViewFormat::Html,
            images: ImageConfig::default(),
            notice_key: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            tls: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_is_secure_follows_base_url_scheme() {
        let mut config = test_config();
        assert!(!config.is_secure());
        config.base_url = Some("https://admin.example.com".to_string());
        assert!(config.is_secure());
        config.base_url = Some("http://localhost:3001".to_string());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_is_secure_without_base_url_follows_tls() {
        let mut config = test_config();
        config.tls = Some(TlsConfig {
            cert_pem: "-----BEGIN CERTIFICATE-----".to_string(),
            key_pem: SecretString::from("key"),
        });
        assert!(config.is_secure());
    }

    #[test]
    fn test_validate_url_or_path() {
        assert!(validate_url_or_path("/static/images/noimage.png", "X").is_ok());
        assert!(validate_url_or_path("https://blobs.example.com/products", "X").is_ok());
        assert!(matches!(
            validate_url_or_path("not a url", "X"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_default_image_config_resolves_placeholder() {
        let urls = ImageConfig::default().urls();
        assert_eq!(urls.placeholder_url(), DEFAULT_IMAGE_PLACEHOLDER_URL);
    }

    #[test]
    fn test_parse_env_or_uses_default() {
        let port: u16 = parse_env_or("SHOPPING_TEST_UNSET_PORT", "3001").unwrap();
        assert_eq!(port, 3001);

        let locale: Result<Locale, _> = parse_env_or("SHOPPING_TEST_UNSET_LOCALE", "fr");
        assert!(matches!(locale, Err(ConfigError::InvalidEnvVar(key, _)) if key == "SHOPPING_TEST_UNSET_LOCALE"));
    }

    #[test]
    fn test_sample_rate_defaults_to_one() {
        assert!((sample_rate("SHOPPING_TEST_UNSET_RATE") - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_tls_config_debug_redacts_key() {
        let config = TlsConfig {
            cert_pem: "-----BEGIN CERTIFICATE-----".to_string(),
            key_pem: SecretString::from("super_secret_private_key"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_private_key"));
    }
}
