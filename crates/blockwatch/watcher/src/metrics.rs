//! Watcher metrics

use metrics::{Counter, Gauge};
use metrics_derive::Metrics;

/// Metrics of the reconciliation loop and the dispatcher
#[derive(Metrics, Clone)]
#[metrics(scope = "blockwatch")]
pub(crate) struct WatcherMetrics {
    /// Blocks waiting for the relay to catch up
    pub(crate) backlog_blocks: Gauge,
    /// Blocks checked to completion
    pub(crate) blocks_checked_total: Counter,
    /// Checks with at least one serious finding
    pub(crate) serious_findings_total: Counter,
    /// Checks whose worst finding is less serious
    pub(crate) less_serious_findings_total: Counter,
    /// Failed relay queries for the latest indexed block
    pub(crate) relay_errors_total: Counter,
    /// Checks deferred to a later cycle
    pub(crate) retryable_check_errors_total: Counter,
    /// Alerts that could not be delivered
    pub(crate) notifications_failed_total: Counter,
}
