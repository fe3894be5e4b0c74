//! Outbound HTTP with bounded exponential backoff

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// How many times to try a call and how long to wait between tries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay unit; the wait after failed attempt `k` is `base_delay * 2^k`
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. At least one attempt is always made.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }
}

/// Runs one logical request with retries.
///
/// A try is retried when the transport fails or the status is not 2xx. When
/// attempts run out the last response is returned as-is, so callers still
/// see non-success statuses; a transport failure on the last try becomes an
/// error.
#[derive(Debug, Clone)]
pub struct RetryingHttpClient {
    client: Client,
    policy: RetryPolicy,
    name: &'static str,
}

impl RetryingHttpClient {
    /// Create a client whose every attempt is bounded by `timeout`.
    ///
    /// `name` tags the retry log lines (e.g. "token", "sms").
    pub fn new(name: &'static str, policy: RetryPolicy, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            policy,
            name,
        })
    }

    /// Send the request produced by `build`, retrying per the policy.
    ///
    /// `build` is called once per attempt since a sent request is consumed.
    pub async fn execute<F>(&self, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt = 1;
        loop {
            let outcome = build(&self.client).send().await;

            let failure = match &outcome {
                Ok(response) if response.status().is_success() => None,
                Ok(response) => Some(response.status().to_string()),
                // Malformed requests fail the same way every time.
                Err(err) if err.is_builder() => None,
                Err(err) => Some(err.to_string()),
            };

            match failure {
                Some(reason) if attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        client = self.name,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %reason,
                        "Request attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                _ => {
                    debug!(client = self.name, attempt, "Request finished");
                    return outcome.map_err(Error::from);
                }
            }
        }
    }
}
