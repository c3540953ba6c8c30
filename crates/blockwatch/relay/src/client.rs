//! Relay API trait and its HTTP implementation

use crate::{GetBlocksOptions, GetBlocksResponse, RelayError};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::{sync::Arc, time::Duration};
use tracing::{debug, trace};

/// Read access to the relay's record of blocks and bundles
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// Query relay blocks
    async fn get_blocks(&self, options: &GetBlocksOptions) -> Result<GetBlocksResponse, RelayError>;

    /// Highest block height the relay has fully indexed
    async fn latest_block_number(&self, block_number: u64) -> Result<u64, RelayError> {
        let response = self.get_blocks(&GetBlocksOptions::at_block(block_number)).await?;
        Ok(response.latest_block_number)
    }
}

#[async_trait]
impl<T: RelayApi + ?Sized> RelayApi for Arc<T> {
    async fn get_blocks(&self, options: &GetBlocksOptions) -> Result<GetBlocksResponse, RelayError> {
        (**self).get_blocks(options).await
    }

    async fn latest_block_number(&self, block_number: u64) -> Result<u64, RelayError> {
        (**self).latest_block_number(block_number).await
    }
}

/// [`RelayApi`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    client: Client,
    url: Url,
}

impl HttpRelayClient {
    /// Public Flashbots blocks API endpoint
    pub const DEFAULT_URL: &'static str = "https://blocks.flashbots.net/v1/blocks";

    /// Per-request timeout
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a client for the blocks endpoint at `url`
    pub fn new(url: &str) -> Result<Self, RelayError> {
        Self::with_client(Client::new(), url)
    }

    /// Create a client reusing an existing HTTP client
    pub fn with_client(client: Client, url: &str) -> Result<Self, RelayError> {
        let url = Url::parse(url)
            .map_err(|e| RelayError::InvalidUrl { url: url.to_string(), reason: e.to_string() })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RelayError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        Ok(Self { client, url })
    }

    /// Endpoint this client queries
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl RelayApi for HttpRelayClient {
    async fn get_blocks(&self, options: &GetBlocksOptions) -> Result<GetBlocksResponse, RelayError> {
        trace!(target: "blockwatch::relay", ?options, "Querying relay blocks");

        let body = self
            .client
            .get(self.url.clone())
            .query(options)
            .timeout(Self::REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: GetBlocksResponse = serde_json::from_str(&body)?;
        debug!(
            target: "blockwatch::relay",
            blocks = response.blocks.len(),
            latest = response.latest_block_number,
            "Relay blocks received"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_client_url_validation() {
        assert!(HttpRelayClient::new(HttpRelayClient::DEFAULT_URL).is_ok());

        let err = HttpRelayClient::new("not a url").unwrap_err();
        assert!(matches!(err, RelayError::InvalidUrl { .. }));

        let err = HttpRelayClient::new("ftp://blocks.example.org").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme ftp"));
    }

    /// Serves a fixed latest block and counts how often it is asked
    struct FixedRelay {
        latest: u64,
        calls: AtomicU64,
    }

    #[async_trait]
    impl RelayApi for FixedRelay {
        async fn get_blocks(&self, _options: &GetBlocksOptions) -> Result<GetBlocksResponse, RelayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(GetBlocksResponse { blocks: Vec::new(), latest_block_number: self.latest })
        }
    }

    #[tokio::test]
    async fn test_latest_block_number_default() {
        let relay = Arc::new(FixedRelay { latest: 42, calls: AtomicU64::new(0) });

        assert_eq!(relay.latest_block_number(40).await.unwrap(), 42);
        assert_eq!(relay.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_query_serialization() {
        let query = serde_json::to_value(GetBlocksOptions::at_block(12)).unwrap();
        assert_eq!(query, serde_json::json!({ "block_number": 12 }));

        let query = serde_json::to_value(GetBlocksOptions::recent(10_000)).unwrap();
        assert_eq!(query, serde_json::json!({ "limit": 10_000 }));
    }
}
