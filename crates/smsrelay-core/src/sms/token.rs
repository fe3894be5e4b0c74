//! OAuth2 client-credentials token cache

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::{require, SmsProviderConfig};
use crate::error::{Error, Result};

use super::retry::{RetryPolicy, RetryingHttpClient};

/// Token plus its absolute expiry, replaced as a whole on refresh
#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>, buffer: chrono::Duration) -> bool {
        self.expires_at > now + buffer
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest {
    grant_type: String,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    #[serde(alias = "AccessToken", alias = "access_token")]
    access_token: String,
    #[serde(alias = "AccessTokenExpiresIn", alias = "expires_in")]
    access_token_expires_in: u32,
}

/// Caches the provider's bearer token and refreshes it on demand.
///
/// A cached token is served without I/O until it comes within the refresh
/// buffer of its expiry. Refreshes go through a single async gate: a caller
/// that finds the token stale takes the gate, checks the cache again (another
/// caller may have refreshed it meanwhile) and only then hits the auth
/// endpoint. Concurrent callers therefore share one auth request.
///
/// A failed refresh leaves the previous entry untouched and returns the
/// error to the caller that attempted it; the next caller through the gate
/// tries again on its own.
pub struct TokenCache {
    http: RetryingHttpClient,
    auth_endpoint: String,
    request: TokenRequest,
    refresh_buffer: chrono::Duration,
    cached: RwLock<Option<CachedToken>>,
    refresh_gate: Mutex<()>,
}

impl TokenCache {
    /// Build the cache. Fails if the auth endpoint or credentials are missing.
    pub fn new(config: &SmsProviderConfig) -> Result<Self> {
        let auth_endpoint = require(&config.auth_endpoint, "auth_endpoint")?.to_string();
        let client_id = require(&config.client_id, "client_id")?.to_string();
        let client_secret = require(&config.client_secret, "client_secret")?.to_string();
        if config.grant_type.trim().is_empty() {
            return Err(Error::config("sms_provider.grant_type is required"));
        }

        let refresh_buffer = chrono::Duration::from_std(config.token_refresh_buffer)
            .map_err(|e| Error::config(format!("sms_provider.token_refresh_buffer: {e}")))?;

        let http = RetryingHttpClient::new(
            "token",
            RetryPolicy::new(config.token_max_retries, config.token_retry_base_delay),
            config.request_timeout,
        )?;

        Ok(Self {
            http,
            auth_endpoint,
            request: TokenRequest {
                grant_type: config.grant_type.clone(),
                client_id,
                client_secret,
            },
            refresh_buffer,
            cached: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        })
    }

    /// Return a token valid beyond the refresh buffer, fetching one if needed.
    pub async fn get_token(&self) -> Result<String> {
        if let Some(token) = self.fresh_token() {
            debug!("Using cached access token");
            return Ok(token);
        }

        let _gate = self.refresh_gate.lock().await;

        if let Some(token) = self.fresh_token() {
            debug!("Access token refreshed by another caller");
            return Ok(token);
        }

        self.refresh().await
    }

    /// Expiry of the cached token, if any
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.cached.read().as_ref().map(|t| t.expires_at)
    }

    fn fresh_token(&self) -> Option<String> {
        let now = Utc::now();
        self.cached
            .read()
            .as_ref()
            .filter(|t| t.is_fresh(now, self.refresh_buffer))
            .map(|t| t.token.clone())
    }

    async fn refresh(&self) -> Result<String> {
        info!("Requesting access token from auth endpoint");

        let response = self
            .http
            .execute(|client| client.post(&self.auth_endpoint).json(&self.request))
            .await
            .map_err(|e| {
                error!(error = %e, "Token request could not be sent");
                e
            })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!(status = %status, body = %body, "Token request failed");
            return Err(Error::auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::auth(format!("invalid token response: {e}")))?;
        if parsed.access_token.is_empty() {
            return Err(Error::auth("invalid token response: accessToken is missing"));
        }

        let expires_at =
            Utc::now() + chrono::Duration::seconds(i64::from(parsed.access_token_expires_in));
        *self.cached.write() = Some(CachedToken {
            token: parsed.access_token.clone(),
            expires_at,
        });

        info!(
            expires_in = parsed.access_token_expires_in,
            "Access token obtained"
        );
        Ok(parsed.access_token)
    }
}
