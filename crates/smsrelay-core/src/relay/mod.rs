//! Alert relay: filter, render and send each alert of a webhook batch

mod filter;
mod renderer;

pub use filter::should_process;
pub use renderer::render;

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::models::{AlertBatch, RelayResult};
use crate::sms::MessageSender;

/// Relays Alertmanager batches to a [`MessageSender`]
#[derive(Clone)]
pub struct AlertRelay {
    sender: Arc<dyn MessageSender>,
}

impl AlertRelay {
    /// Create a relay that delivers through `sender`
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self { sender }
    }

    /// Process every alert of a batch in order.
    ///
    /// Only an empty batch is an error. A failed send is logged and left out
    /// of both `processed` and `skipped`; the remaining alerts still go out.
    pub async fn relay(&self, batch: &AlertBatch) -> Result<RelayResult> {
        if batch.alerts.is_empty() {
            warn!(group_key = %batch.group_key, "Received empty or invalid alert payload");
            return Err(Error::validation("Invalid alert payload"));
        }

        let mut result = RelayResult {
            total: batch.alerts.len(),
            ..RelayResult::default()
        };

        for alert in &batch.alerts {
            let alertname = alert.label("alertname");

            if !should_process(alert) {
                debug!(
                    alertname,
                    severity = alert.label("severity"),
                    status = %alert.status,
                    "Skipping alert"
                );
                result.skipped += 1;
                continue;
            }

            let message = render(alert);
            if self.sender.send(&message).await {
                info!(alertname, "Successfully processed alert");
                result.processed += 1;
            } else {
                error!(alertname, "Failed to send SMS for alert");
            }
        }

        info!(
            processed = result.processed,
            skipped = result.skipped,
            failed = result.failed(),
            total = result.total,
            "Alert batch relayed"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Alert, RenderedMessage};
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// Records messages and fails any whose text contains `fail_on`
    #[derive(Default)]
    struct RecordingSender {
        fail_on: Option<&'static str>,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send(&self, message: &RenderedMessage) -> bool {
            self.sent.lock().push(message.as_str().to_string());
            !self.fail_on.is_some_and(|needle| message.as_str().contains(needle))
        }
    }

    fn alert(name: &str, status: &str, severity: &str) -> Alert {
        Alert {
            status: status.to_string(),
            labels: HashMap::from([
                ("alertname".to_string(), name.to_string()),
                ("severity".to_string(), severity.to_string()),
            ]),
            annotations: HashMap::new(),
            starts_at: Utc::now(),
            ends_at: None,
            fingerprint: String::new(),
            generator_url: None,
        }
    }

    fn batch(alerts: Vec<Alert>) -> AlertBatch {
        AlertBatch {
            version: "4".to_string(),
            status: "firing".to_string(),
            alerts,
            ..AlertBatch::default()
        }
    }

    #[tokio::test]
    async fn test_mixed_batch_counts() {
        let sender = Arc::new(RecordingSender {
            fail_on: Some("Flaky"),
            ..Default::default()
        });
        let relay = AlertRelay::new(sender.clone());

        let result = relay
            .relay(&batch(vec![
                alert("DiskFull", "firing", "critical"),
                alert("Recovered", "resolved", "critical"),
                alert("Flaky", "firing", "warning"),
                alert("Chatty", "firing", "info"),
                alert("MemoryHigh", "FIRING", "Warning"),
            ]))
            .await
            .unwrap();

        assert_eq!(
            result,
            RelayResult {
                processed: 2,
                skipped: 2,
                total: 5
            }
        );
        assert_eq!(result.failed(), 1);

        let sent = sender.sent.lock();
        assert_eq!(sent.len(), 3);
        assert!(sent[0].starts_with("[CRITICAL] DiskFull"));
        assert!(sent[1].starts_with("[WARNING] Flaky"));
        assert!(sent[2].starts_with("[WARNING] MemoryHigh"));
    }

    #[tokio::test]
    async fn test_all_skipped_sends_nothing() {
        let sender = Arc::new(RecordingSender::default());
        let relay = AlertRelay::new(sender.clone());

        let result = relay
            .relay(&batch(vec![
                alert("A", "resolved", "critical"),
                alert("B", "firing", "none"),
            ]))
            .await
            .unwrap();

        assert_eq!(result.skipped, 2);
        assert_eq!(result.processed, 0);
        assert!(sender.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let relay = AlertRelay::new(Arc::new(RecordingSender::default()));
        let err = relay.relay(&batch(vec![])).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
