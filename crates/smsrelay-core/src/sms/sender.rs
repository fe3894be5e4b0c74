//! SMS provider client

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info};

use crate::config::{require, SmsProviderConfig};
use crate::error::Result;
use crate::models::RenderedMessage;

use super::retry::{RetryPolicy, RetryingHttpClient};
use super::token::TokenCache;
use super::MessageSender;

/// Sends SMS through the provider's form-encoded message endpoint
pub struct SmsSender {
    http: RetryingHttpClient,
    tokens: Arc<TokenCache>,
    message_endpoint: String,
    mobile_number: String,
    message_id: Option<String>,
}

impl SmsSender {
    /// Build a sender. Fails if the message endpoint or number is missing.
    pub fn new(config: &SmsProviderConfig, tokens: Arc<TokenCache>) -> Result<Self> {
        let message_endpoint = require(&config.message_endpoint, "message_endpoint")?.to_string();
        let mobile_number = require(&config.mobile_number, "mobile_number")?.to_string();

        let http = RetryingHttpClient::new(
            "sms",
            RetryPolicy::new(config.max_retries, config.retry_base_delay),
            config.request_timeout,
        )?;

        Ok(Self {
            http,
            tokens,
            message_endpoint,
            mobile_number,
            message_id: config.message_id.clone().filter(|id| !id.is_empty()),
        })
    }

    fn next_message_id(&self) -> String {
        self.message_id
            .clone()
            .unwrap_or_else(|| format!("A{}", Utc::now().format("%Y%m%d%H%M%S")))
    }

    async fn try_send(&self, message: &RenderedMessage) -> Result<bool> {
        let token = self.tokens.get_token().await?;
        let message_id = self.next_message_id();

        let form = [
            ("message", message.as_str()),
            ("messageId", message_id.as_str()),
            ("mobileNumber", self.mobile_number.as_str()),
        ];

        let response = self
            .http
            .execute(|client| {
                client
                    .post(&self.message_endpoint)
                    .bearer_auth(&token)
                    .form(&form)
            })
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(message_id = %message_id, "SMS sent");
            return Ok(true);
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            status = %status,
            body = %body,
            message_id = %message_id,
            "SMS send failed"
        );
        Ok(false)
    }
}

#[async_trait]
impl MessageSender for SmsSender {
    async fn send(&self, message: &RenderedMessage) -> bool {
        match self.try_send(message).await {
            Ok(sent) => sent,
            Err(e) => {
                error!(error = %e, "Error while sending SMS");
                false
            }
        }
    }
}
