//! Chain data seam

use crate::SourceError;
use async_trait::async_trait;
use blockwatch_primitives::BlockWithReceipts;
use futures::stream::BoxStream;
use std::sync::Arc;

/// Stream of new head heights
pub type HeadStream = BoxStream<'static, Result<u64, SourceError>>;

/// Access to the chain: new heads and full blocks with receipts
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Subscribe to new heads.
    ///
    /// The stream ending or yielding an error means the subscription is lost.
    async fn subscribe_heads(&self) -> Result<HeadStream, SourceError>;

    /// Fetch the block at `height` with all transaction receipts
    async fn fetch_block(&self, height: u64) -> Result<BlockWithReceipts, SourceError>;
}

#[async_trait]
impl<T: ChainSource + ?Sized> ChainSource for Arc<T> {
    async fn subscribe_heads(&self) -> Result<HeadStream, SourceError> {
        (**self).subscribe_heads().await
    }

    async fn fetch_block(&self, height: u64) -> Result<BlockWithReceipts, SourceError> {
        (**self).fetch_block(height).await
    }
}
