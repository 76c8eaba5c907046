/// Metrics and telemetry for the moderation subsystem
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - Moderation actions (ban / unban)
/// - Ban check outcomes, including fail-open answers
/// - Chat log writes, including dropped and rejected entries
///
/// Fail-open and fail-silent paths never surface errors to callers, so
/// these counters are where an operator sees them.

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    /// Moderation actions by action type
    pub static ref MODERATION_ACTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "moderation_actions_total",
        "Total number of moderation actions",
        &["action"]
    )
    .unwrap();

    /// Ban checks by outcome (banned, allowed, fail_open)
    pub static ref BAN_CHECKS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ban_checks_total",
        "Total number of ban checks",
        &["outcome"]
    )
    .unwrap();

    /// Chat log writes by outcome (stored, disabled, dropped, rejected)
    pub static ref CHAT_LOG_WRITES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "chat_log_writes_total",
        "Total number of chat log write attempts",
        &["outcome"]
    )
    .unwrap();
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Record a moderation action
pub fn record_moderation_action(action: &str) {
    MODERATION_ACTIONS_TOTAL.with_label_values(&[action]).inc();
}

/// Record a ban check outcome
pub fn record_ban_check(outcome: &str) {
    BAN_CHECKS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record a chat log write outcome
pub fn record_chat_log(outcome: &str) {
    CHAT_LOG_WRITES_TOTAL.with_label_values(&[outcome]).inc();
}
