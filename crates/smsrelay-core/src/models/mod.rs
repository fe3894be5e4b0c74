//! Data models for SmsRelay

mod alert;
mod message;
mod relay;

pub use alert::*;
pub use message::*;
pub use relay::*;
