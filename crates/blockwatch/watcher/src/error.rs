//! Watcher error types

use alloy_primitives::B256;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a [`ChainSource`](crate::ChainSource)
#[derive(Debug, Error)]
pub enum SourceError {
    /// The node reported an error or could not be reached
    #[error("RPC error: {0}")]
    Rpc(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The node does not know the requested block (yet)
    #[error("Block {0} not found")]
    BlockNotFound(u64),

    /// The node returned a block without the receipt of one of its transactions
    #[error("Block {block} is missing the receipt of tx {tx}")]
    MissingReceipt {
        /// Height of the block
        block: u64,
        /// Transaction without receipt
        tx: B256,
    },

    /// The head subscription ended
    #[error("Head subscription closed")]
    SubscriptionClosed,

    /// The call did not finish in time
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl SourceError {
    /// Wrap a node or transport error
    pub fn rpc(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Rpc(Box::new(err))
    }
}

/// Errors delivering a notification
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Webhook request failed
    #[error("Webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Payload could not be encoded
    #[error("Failed to encode webhook payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Invalid watcher configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Notifications were enabled without a destination
    #[error("No DISCORD_WEBHOOK environment variable found!")]
    MissingWebhook,

    /// The webhook destination is not a usable URL
    #[error("Invalid webhook URL {url}: {reason}")]
    InvalidWebhook {
        /// The rejected URL
        url: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Errors that stop the reconciliation loop
#[derive(Debug, Error)]
pub enum WatchError {
    /// A new block could not be fetched, even after retrying
    #[error("Failed to fetch block {block}: {source}")]
    Fetch {
        /// Height of the block
        block: u64,
        /// Last fetch error
        #[source]
        source: SourceError,
    },

    /// The head subscription could not be re-established
    #[error("Head subscription failed: {0}")]
    Subscription(#[source] SourceError),
}
