//! Configuration management for SmsRelay
//!
//! Values are layered: built-in defaults, then an optional config file, then
//! `SMSRELAY_`-prefixed environment variables (`__` separates nested keys,
//! e.g. `SMSRELAY_SMS_PROVIDER__CLIENT_ID`).

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SMSRELAY";

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// SMS provider configuration
    pub sms_provider: SmsProviderConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from `.env`, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        check_dotenv(dotenvy::dotenv())?;

        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        let config: Config = builder.build()?.try_deserialize()?;
        config.sms_provider.validate_retries()?;
        Ok(config)
    }
}

/// A missing `.env` is fine; one that cannot be read or parsed is not.
fn check_dotenv<T>(outcome: dotenvy::Result<T>) -> Result<()> {
    match outcome {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(Error::config(format!("failed to load .env: {err}"))),
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// HTTP port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// `host:port` bind address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// SMS provider configuration
///
/// Endpoints, destination number and client credentials have no defaults.
/// They are checked when the token cache and sender are built, so a missing
/// value stops startup instead of failing individual requests.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsProviderConfig {
    /// OAuth2 token endpoint
    pub auth_endpoint: Option<String>,
    /// SMS send endpoint
    pub message_endpoint: Option<String>,
    /// Destination mobile number
    pub mobile_number: Option<String>,
    /// OAuth2 grant type
    pub grant_type: String,
    /// OAuth2 client id
    pub client_id: Option<String>,
    /// OAuth2 client secret
    pub client_secret: Option<String>,
    /// Fixed message id; generated per send when unset
    pub message_id: Option<String>,
    /// Attempts per SMS send
    pub max_retries: u32,
    /// Attempts per token request
    pub token_max_retries: u32,
    /// Base backoff delay for SMS sends
    #[serde(with = "humantime_serde")]
    pub retry_base_delay: Duration,
    /// Base backoff delay for token requests
    #[serde(with = "humantime_serde")]
    pub token_retry_base_delay: Duration,
    /// Tokens expiring within this window are refreshed before use
    #[serde(with = "humantime_serde")]
    pub token_refresh_buffer: Duration,
    /// Timeout applied to every outbound attempt
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for SmsProviderConfig {
    fn default() -> Self {
        Self {
            auth_endpoint: None,
            message_endpoint: None,
            mobile_number: None,
            grant_type: "client_credentials".to_string(),
            client_id: None,
            client_secret: None,
            message_id: None,
            max_retries: 3,
            token_max_retries: 3,
            retry_base_delay: Duration::from_secs(2),
            token_retry_base_delay: Duration::from_secs(2),
            token_refresh_buffer: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for SmsProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsProviderConfig")
            .field("auth_endpoint", &self.auth_endpoint)
            .field("message_endpoint", &self.message_endpoint)
            .field("mobile_number", &self.mobile_number)
            .field("grant_type", &self.grant_type)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("message_id", &self.message_id)
            .field("max_retries", &self.max_retries)
            .field("token_max_retries", &self.token_max_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("token_retry_base_delay", &self.token_retry_base_delay)
            .field("token_refresh_buffer", &self.token_refresh_buffer)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl SmsProviderConfig {
    fn validate_retries(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(Error::config("sms_provider.max_retries must be at least 1"));
        }
        if self.token_max_retries == 0 {
            return Err(Error::config(
                "sms_provider.token_max_retries must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Returns the value of a required setting, rejecting missing or blank values.
pub fn require<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::config(format!("sms_provider.{key} is required"))),
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::env;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SmsProviderConfig::default();
        assert_eq!(config.grant_type, "client_credentials");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.token_max_retries, 3);
        assert_eq!(config.retry_base_delay, Duration::from_secs(2));
        assert_eq!(config.token_refresh_buffer, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[sms_provider]
auth_endpoint = "https://sms.example.com/oauth/token"
message_endpoint = "https://sms.example.com/messages"
mobile_number = "905551112233"
client_id = "relay"
client_secret = "s3cret"
max_retries = 5
retry_base_delay = "500ms"

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.sms_provider.max_retries, 5);
        assert_eq!(config.sms_provider.token_max_retries, 3);
        assert_eq!(config.sms_provider.retry_base_delay, Duration::from_millis(500));
        assert_eq!(config.sms_provider.client_id.as_deref(), Some("relay"));
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    #[serial]
    fn test_zero_retries_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[sms_provider]\nmax_retries = 0").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    #[serial]
    fn test_env_values_kept_verbatim() {
        env::set_var("SMSRELAY_SMS_PROVIDER__MOBILE_NUMBER", "+905551112233");
        env::set_var("SMSRELAY_SMS_PROVIDER__CLIENT_SECRET", "0042");
        env::set_var("SMSRELAY_SMS_PROVIDER__MAX_RETRIES", "7");
        env::set_var("SMSRELAY_SERVER__PORT", "9191");

        let loaded = Config::load(None);

        env::remove_var("SMSRELAY_SMS_PROVIDER__MOBILE_NUMBER");
        env::remove_var("SMSRELAY_SMS_PROVIDER__CLIENT_SECRET");
        env::remove_var("SMSRELAY_SMS_PROVIDER__MAX_RETRIES");
        env::remove_var("SMSRELAY_SERVER__PORT");

        let config = loaded.unwrap();
        assert_eq!(
            config.sms_provider.mobile_number.as_deref(),
            Some("+905551112233")
        );
        assert_eq!(config.sms_provider.client_secret.as_deref(), Some("0042"));
        assert_eq!(config.sms_provider.max_retries, 7);
        assert_eq!(config.server.port, 9191);
    }

    #[test]
    fn test_missing_dotenv_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = dotenvy::from_path(dir.path().join(".env"));
        assert!(check_dotenv(outcome).is_ok());
    }

    #[test]
    fn test_malformed_dotenv_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not an assignment").unwrap();

        let err = check_dotenv(dotenvy::from_path(file.path())).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_require() {
        assert_eq!(require(&Some("x".to_string()), "client_id").unwrap(), "x");
        assert!(require(&None, "client_id").is_err());
        assert!(require(&Some("  ".to_string()), "client_id").is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = SmsProviderConfig {
            client_secret: Some("hunter2".to_string()),
            ..Default::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
