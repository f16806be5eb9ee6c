//! Room Controller configuration.
//!
//! Configuration is loaded from environment variables. Sensitive fields
//! are held as `SecretString` and redacted in Debug output.

use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default conferencing-provider base URL.
pub const DEFAULT_PROVIDER_BASE_URL: &str = "http://localhost:8090";

/// Default per-request provider timeout in seconds.
pub const DEFAULT_PROVIDER_TIMEOUT_SECONDS: u64 = 10;

/// Default media region when a join request does not name one.
pub const DEFAULT_MEDIA_REGION: &str = "us-east-1";

/// Default meeting-record TTL in seconds (24 hours).
pub const DEFAULT_MEETING_RECORD_TTL_SECONDS: i64 = 86_400;

/// Default attendee-record TTL in seconds (24 hours).
pub const DEFAULT_ATTENDEE_RECORD_TTL_SECONDS: i64 = 86_400;

/// Default expiry-sweep interval in seconds.
pub const DEFAULT_EXPIRY_SWEEP_INTERVAL_SECONDS: u64 = 300;

/// Room Controller configuration.
///
/// Loaded from environment variables with sensible defaults.
/// Sensitive fields are redacted in Debug output.
#[derive(Clone)]
pub struct Config {
    /// Postgres connection URL (may embed credentials).
    /// Protected by `SecretString` to prevent accidental logging.
    pub database_url: SecretString,

    /// Conferencing provider API base URL.
    pub provider_base_url: String,

    /// API key for the conferencing provider.
    /// Protected by `SecretString` to prevent accidental logging.
    pub provider_api_key: SecretString,

    /// Bounded per-request timeout for provider calls, in seconds.
    pub provider_timeout_seconds: u64,

    /// Media region used when a join request leaves the region empty.
    pub default_media_region: String,

    /// Meeting-record TTL in seconds.
    pub meeting_record_ttl_seconds: i64,

    /// Attendee-record TTL in seconds.
    pub attendee_record_ttl_seconds: i64,

    /// Interval between physical expiry sweeps, in seconds.
    pub expiry_sweep_interval_seconds: u64,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("provider_base_url", &self.provider_base_url)
            .field("provider_api_key", &"[REDACTED]")
            .field("provider_timeout_seconds", &self.provider_timeout_seconds)
            .field("default_media_region", &self.default_media_region)
            .field(
                "meeting_record_ttl_seconds",
                &self.meeting_record_ttl_seconds,
            )
            .field(
                "attendee_record_ttl_seconds",
                &self.attendee_record_ttl_seconds,
            )
            .field(
                "expiry_sweep_interval_seconds",
                &self.expiry_sweep_interval_seconds,
            )
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = SecretString::from(
            vars.get("DATABASE_URL")
                .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
                .clone(),
        );

        let provider_api_key = SecretString::from(
            vars.get("RC_PROVIDER_API_KEY")
                .ok_or_else(|| ConfigError::MissingEnvVar("RC_PROVIDER_API_KEY".to_string()))?
                .clone(),
        );

        let provider_base_url = vars
            .get("RC_PROVIDER_BASE_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_PROVIDER_BASE_URL.to_string());

        let provider_timeout_seconds = vars
            .get("RC_PROVIDER_TIMEOUT_SECONDS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECONDS);

        let default_media_region = vars
            .get("RC_DEFAULT_MEDIA_REGION")
            .cloned()
            .unwrap_or_else(|| DEFAULT_MEDIA_REGION.to_string());

        let meeting_record_ttl_seconds = vars
            .get("RC_MEETING_RECORD_TTL_SECONDS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MEETING_RECORD_TTL_SECONDS);

        let attendee_record_ttl_seconds = vars
            .get("RC_ATTENDEE_RECORD_TTL_SECONDS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_ATTENDEE_RECORD_TTL_SECONDS);

        let expiry_sweep_interval_seconds = vars
            .get("RC_EXPIRY_SWEEP_INTERVAL_SECONDS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_EXPIRY_SWEEP_INTERVAL_SECONDS);

        if meeting_record_ttl_seconds <= 0 {
            return Err(ConfigError::InvalidValue(
                "RC_MEETING_RECORD_TTL_SECONDS must be positive".to_string(),
            ));
        }

        if attendee_record_ttl_seconds <= 0 {
            return Err(ConfigError::InvalidValue(
                "RC_ATTENDEE_RECORD_TTL_SECONDS must be positive".to_string(),
            ));
        }

        Ok(Config {
            database_url,
            provider_base_url,
            provider_api_key,
            provider_timeout_seconds,
            default_media_region,
            meeting_record_ttl_seconds,
            attendee_record_ttl_seconds,
            expiry_sweep_interval_seconds,
        })
    }
}
