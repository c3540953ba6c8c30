//! Relay client error types

use thiserror::Error;

/// Errors that can occur when querying the relay
#[derive(Debug, Error)]
pub enum RelayError {
    /// Invalid relay endpoint
    #[error("Invalid relay URL {url}: {reason}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Transport or HTTP status failure
    #[error("Relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("Malformed relay response: {0}")]
    Decode(#[from] serde_json::Error),
}
