//! # SmsRelay
//!
//! Relays Prometheus Alertmanager webhooks to an SMS provider.
//!
//! Firing alerts with `critical` or `warning` severity are rendered into a
//! short text message and sent through a provider API guarded by OAuth2
//! client credentials.
//!
//! ## Architecture
//!
//! - **Relay**: filters a webhook batch, renders each alert, counts outcomes
//! - **SMS**: token cache, retrying HTTP client and the provider sender
//! - **API**: axum receiver for `POST /alert/alert` plus health probes
//!
//! ## Quick Start
//!
//! ```bash
//! # Start the webhook receiver
//! smsrelay --config smsrelay.toml serve
//!
//! # Preview the messages a payload would produce
//! smsrelay render payload.json
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod relay;
pub mod sms;

pub use crate::config::Config;
pub use crate::error::{Error, Result};

use std::sync::Arc;

/// Build the relay and its SMS pipeline from provider settings.
///
/// Fails when a required endpoint, number or credential is missing.
pub fn build_relay(config: &crate::config::SmsProviderConfig) -> Result<relay::AlertRelay> {
    let tokens = Arc::new(sms::TokenCache::new(config)?);
    let sender = sms::SmsSender::new(config, tokens)?;
    Ok(relay::AlertRelay::new(Arc::new(sender)))
}

/// Re-exports for convenience
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
    pub use crate::relay::AlertRelay;
    pub use crate::sms::{MessageSender, SmsSender, TokenCache};
}
