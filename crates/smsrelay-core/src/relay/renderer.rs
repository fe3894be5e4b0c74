//! Turns an alert into SMS text

use crate::models::{Alert, RenderedMessage};

const UNKNOWN: &str = "Unknown";
const NO_SUMMARY: &str = "No summary available";
const STARTED_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Render an alert as a short multi-line message.
///
/// ```text
/// [CRITICAL] HighCPU
/// NS: prod
/// Svc: api
/// Summary: CPU>80%
/// Started: 2026-02-04 10:00:00 UTC
/// ```
pub fn render(alert: &Alert) -> RenderedMessage {
    let alert_name = or_default(alert.label("alertname"), UNKNOWN);
    let namespace = or_default(alert.label("namespace"), UNKNOWN);
    let service = or_default(alert.label("service"), UNKNOWN);
    let severity = or_default(alert.label("severity"), UNKNOWN).to_uppercase();
    let summary = or_default(alert.annotation("summary"), NO_SUMMARY);
    let started = alert.starts_at.format(STARTED_FORMAT);

    RenderedMessage::new(format!(
        "[{severity}] {alert_name}\n\
         NS: {namespace}\n\
         Svc: {service}\n\
         Summary: {summary}\n\
         Started: {started}"
    ))
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}
