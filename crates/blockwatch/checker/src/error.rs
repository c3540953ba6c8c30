//! Block checker error types

use blockwatch_relay::RelayError;
use std::time::Duration;
use thiserror::Error;

/// Errors that prevent a block check from completing
#[derive(Debug, Error)]
pub enum CheckError {
    /// The relay could not be queried
    #[error("Flashbots API error: {0}")]
    Relay(#[from] RelayError),

    /// The relay returned more than one block for a single height
    #[error("Expected at most 1 relay block for height {block}, got {count}")]
    UnexpectedBlockCount {
        /// Requested height
        block: u64,
        /// Number of blocks returned
        count: usize,
    },

    /// The relay answered with a different block than requested
    #[error("Requested relay block {requested}, got {returned}")]
    BlockMismatch {
        /// Requested height
        requested: u64,
        /// Height in the response
        returned: u64,
    },

    /// The check did not finish in time
    #[error("Block check timed out after {0:?}")]
    Timeout(Duration),
}

impl CheckError {
    /// Whether the check may succeed if attempted again later.
    ///
    /// Transport failures and timeouts are retryable; malformed or
    /// inconsistent relay responses are not.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Relay(RelayError::Http(_)) | Self::Timeout(_))
    }
}
