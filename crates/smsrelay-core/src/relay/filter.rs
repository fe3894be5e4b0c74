//! Decides which alerts produce an SMS

use crate::models::Alert;

/// Severities that page someone
const NOTIFY_SEVERITIES: [&str; 2] = ["critical", "warning"];

/// True iff the alert is firing with critical or warning severity.
///
/// Both comparisons ignore case. A missing severity label never matches.
pub fn should_process(alert: &Alert) -> bool {
    if !alert.status.eq_ignore_ascii_case("firing") {
        return false;
    }

    let severity = alert.label("severity").to_lowercase();
    NOTIFY_SEVERITIES.contains(&severity.as_str())
}
