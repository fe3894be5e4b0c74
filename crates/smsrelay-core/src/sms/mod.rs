//! SMS delivery
//!
//! Sends rendered messages to the provider using a cached OAuth2 bearer token,
//! retrying transient failures with exponential backoff.

mod retry;
mod sender;
mod token;

pub use retry::{RetryPolicy, RetryingHttpClient};
pub use sender::SmsSender;
pub use token::TokenCache;

use async_trait::async_trait;

use crate::models::RenderedMessage;

/// Something that can deliver a rendered message.
///
/// Delivery failures are reported as `false`, never as errors, so one bad
/// send cannot abort a batch.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver a message, returning whether the provider accepted it
    async fn send(&self, message: &RenderedMessage) -> bool;
}

#[cfg(test)]
pub(crate) fn test_config(base_url: &str) -> crate::config::SmsProviderConfig {
    crate::config::SmsProviderConfig {
        auth_endpoint: Some(format!("{base_url}/oauth/token")),
        message_endpoint: Some(format!("{base_url}/sms")),
        mobile_number: Some("905551112233".to_string()),
        client_id: Some("relay".to_string()),
        client_secret: Some("s3cret".to_string()),
        retry_base_delay: std::time::Duration::from_millis(1),
        token_retry_base_delay: std::time::Duration::from_millis(1),
        ..Default::default()
    }
}
