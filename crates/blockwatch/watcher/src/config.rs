//! Watcher configuration

use crate::ConfigError;
use backon::ExponentialBuilder;
use std::time::Duration;

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub min_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Retries after the first attempt
    pub max_attempts: usize,
}

impl RetryPolicy {
    /// Default policy for fetching a block from the node
    pub const FETCH: Self = Self {
        min_delay: Duration::from_millis(500),
        max_delay: Duration::from_secs(10),
        max_attempts: 5,
    };

    /// Default policy for re-establishing the head subscription
    pub const RECONNECT: Self = Self {
        min_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(60),
        max_attempts: 10,
    };

    /// Backoff builder for this policy
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_attempts)
    }
}

/// Configuration of the [`ReconciliationLoop`](crate::ReconciliationLoop)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// Suppress per-block progress lines
    pub silent: bool,
    /// Delay after each serious finding, limiting the alert rate
    pub pacing: Duration,
    /// Upper bound for every call to the node, the relay and the checker
    pub call_timeout: Duration,
    /// Retries for block fetches
    pub fetch_retry: RetryPolicy,
    /// Retries for the head subscription
    pub reconnect: RetryPolicy,
    /// Most heights queued at once to fill a gap in the head sequence
    pub gap_backfill_limit: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            silent: false,
            pacing: Duration::from_secs(1),
            call_timeout: Duration::from_secs(10),
            fetch_retry: RetryPolicy::FETCH,
            reconnect: RetryPolicy::RECONNECT,
            gap_backfill_limit: 64,
        }
    }
}

/// Where alerts go
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationConfig {
    /// Post alerts to the webhook
    pub enabled: bool,
    /// Webhook destination
    pub webhook_url: Option<String>,
}

impl NotificationConfig {
    /// Alerts disabled
    pub const fn disabled() -> Self {
        Self { enabled: false, webhook_url: None }
    }

    /// Alerts enabled, posting to `webhook_url` if given
    pub const fn enabled(webhook_url: Option<String>) -> Self {
        Self { enabled: true, webhook_url }
    }

    /// Webhook to post to, `None` if alerts are disabled.
    ///
    /// Fails if alerts are enabled without a destination.
    pub fn validate(&self) -> Result<Option<&str>, ConfigError> {
        if !self.enabled {
            return Ok(None)
        }
        match self.webhook_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(Some(url)),
            _ => Err(ConfigError::MissingWebhook),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_notification_validation() {
        assert_eq!(NotificationConfig::disabled().validate().unwrap(), None);
        assert_eq!(
            NotificationConfig::enabled(Some("https://discord.com/api/webhooks/1/x".into()))
                .validate()
                .unwrap(),
            Some("https://discord.com/api/webhooks/1/x")
        );
        assert_matches!(
            NotificationConfig::enabled(None).validate(),
            Err(ConfigError::MissingWebhook)
        );
        assert_matches!(
            NotificationConfig::enabled(Some(" ".into())).validate(),
            Err(ConfigError::MissingWebhook)
        );
    }

    #[test]
    fn test_retry_policy_bounded() {
        use backon::BackoffBuilder;

        let delays: Vec<_> = RetryPolicy {
            min_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(40),
            max_attempts: 4,
        }
        .backoff()
        .build()
        .collect();

        assert_eq!(delays.len(), 4);
        assert!(delays.iter().all(|d| *d <= Duration::from_millis(40)));
    }
}
