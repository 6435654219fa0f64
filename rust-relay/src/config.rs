//! Configuration module for environment variable parsing.
//!
//! All settings are read once at startup into a [`Config`] that is handed to the
//! signature check and the trigger dispatcher. Missing secrets are fatal here,
//! never per request.

use std::env;
use std::fmt;

use thiserror::Error;
use tracing::warn;
use url::Url;

/// Default Refersion endpoint for creating affiliate triggers.
pub const DEFAULT_REFERSION_API_URL: &str = "https://www.refersion.com/api/new_affiliate_trigger";

/// Default ceiling for an inbound webhook body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Startup configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {0} is set but blank")]
    Blank(&'static str),

    #[error("invalid REFERSION_API_URL {value:?}: {source}")]
    InvalidApiUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Shopify app secret used to key the webhook HMAC
    pub shopify_app_secret: String,

    /// Refersion API public key
    pub refersion_public_key: String,

    /// Refersion API secret key
    pub refersion_secret_key: String,

    /// Upstream endpoint for new affiliate triggers
    pub refersion_api_url: Url,

    /// HTTP request timeout in milliseconds for the outbound trigger call
    pub request_timeout_ms: u64,

    /// Largest webhook body read before the request is rejected
    pub max_body_bytes: usize,

    /// Port for the web server to listen on
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let shopify_app_secret = required(&lookup, "SHOPIFY_APP_SECRET")?;
        let refersion_public_key = required(&lookup, "REFERSION_PUBLIC_KEY")?;
        let refersion_secret_key = required(&lookup, "REFERSION_SECRET_KEY")?;

        let raw_url = lookup("REFERSION_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_REFERSION_API_URL.to_string());
        let refersion_api_url =
            Url::parse(&raw_url).map_err(|source| ConfigError::InvalidApiUrl {
                value: raw_url.clone(),
                source,
            })?;

        Ok(Config {
            shopify_app_secret,
            refersion_public_key,
            refersion_secret_key,
            refersion_api_url,
            request_timeout_ms: parse_number(&lookup, "REQUEST_TIMEOUT_MS", 8000),
            max_body_bytes: parse_number(&lookup, "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
            port: parse_number(&lookup, "PORT", 8080),
        })
    }
}

// Secrets stay out of log lines even when the config is printed with `?`.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("shopify_app_secret", &"<redacted>")
            .field("refersion_public_key", &"<redacted>")
            .field("refersion_secret_key", &"<redacted>")
            .field("refersion_api_url", &self.refersion_api_url.as_str())
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("port", &self.port)
            .finish()
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).ok_or(ConfigError::Missing(name))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Blank(name));
    }
    Ok(value)
}

/// Parse an optional numeric variable, falling back to the default when unset or malformed.
fn parse_number<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = match lookup(name) {
        Some(v) => v,
        None => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid numeric value, using default");
            default
        }
    }
}
