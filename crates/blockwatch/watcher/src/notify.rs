//! Alert delivery

use crate::{ConfigError, NotifyError, metrics::WatcherMetrics};
use async_trait::async_trait;
use blockwatch_primitives::BlockCheck;
use reqwest::{Client, Url, header::CONTENT_TYPE};
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

/// Delivers a text alert somewhere a human will see it
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message`
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        (**self).notify(message).await
    }
}

/// [`Notifier`] posting to a Discord webhook
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    client: Client,
    url: Url,
}

impl DiscordWebhook {
    /// Longest message Discord accepts, in characters
    pub const MAX_MESSAGE_LEN: usize = 2000;

    /// Per-request timeout
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a notifier posting to `url`
    pub fn new(url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(url)
            .map_err(|e| ConfigError::InvalidWebhook { url: url.to_string(), reason: e.to_string() })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidWebhook {
                url: url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        Ok(Self { client: Client::new(), url: parsed })
    }

    /// Request body for `message`, truncated to [`Self::MAX_MESSAGE_LEN`]
    pub fn payload(message: &str) -> serde_json::Value {
        serde_json::json!({ "content": truncate_chars(message, Self::MAX_MESSAGE_LEN) })
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let body = serde_json::to_vec(&Self::payload(message))?;
        self.client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .timeout(Self::REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Sends alerts for serious findings if a [`Notifier`] is configured.
///
/// Delivery failures are logged and counted, never propagated.
#[derive(Debug)]
pub struct NotificationSink<N> {
    notifier: Option<N>,
    metrics: WatcherMetrics,
}

impl<N: Notifier> NotificationSink<N> {
    /// Create a sink, alerting through `notifier` if given
    pub fn new(notifier: Option<N>) -> Self {
        Self { notifier, metrics: WatcherMetrics::default() }
    }

    /// Create a sink that never alerts
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Whether alerts are delivered
    pub const fn is_enabled(&self) -> bool {
        self.notifier.is_some()
    }

    /// Alert text for a check.
    ///
    /// A block whose only finding is a zero-fee bundle gets the one-line
    /// form, anything else the full report.
    pub fn alert_message(check: &BlockCheck) -> String {
        if check.is_single_zero_fee_bundle() { check.render_short(true) } else { check.render(true) }
    }

    /// Alert on `check`, returning whether an alert was delivered
    pub async fn alert(&self, check: &BlockCheck) -> bool {
        let Some(notifier) = &self.notifier else { return false };

        let message = Self::alert_message(check);
        match notifier.notify(&message).await {
            Ok(()) => {
                debug!(target: "blockwatch::notify", block = check.number, "Alert sent");
                true
            }
            Err(err) => {
                self.metrics.notifications_failed_total.increment(1);
                warn!(target: "blockwatch::notify", block = check.number, %err, "Failed to send alert");
                false
            }
        }
    }
}
