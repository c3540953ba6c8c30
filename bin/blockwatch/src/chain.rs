//! Chain access over Ethereum JSON-RPC

use alloy_eips::{BlockId, BlockNumberOrTag};
use alloy_network::{ReceiptResponse, TransactionResponse};
use alloy_primitives::B256;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::{Block, TransactionReceipt};
use async_trait::async_trait;
use blockwatch_primitives::{BlockWithReceipts, TxWithReceipt};
use blockwatch_watcher::{ChainSource, HeadStream, SourceError};
use futures::StreamExt;
use std::{collections::HashMap, fmt};
use tracing::{debug, trace};

/// [`ChainSource`] backed by a node's JSON-RPC endpoint.
///
/// Head subscriptions need a websocket or IPC endpoint.
#[derive(Clone)]
pub(crate) struct RpcChainSource {
    provider: DynProvider,
    url: String,
}

impl fmt::Debug for RpcChainSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcChainSource").field("url", &self.url).finish_non_exhaustive()
    }
}

impl RpcChainSource {
    /// Connect to the node at `url`
    pub(crate) async fn connect(url: &str) -> Result<Self, SourceError> {
        let provider = ProviderBuilder::new().connect(url).await.map_err(SourceError::rpc)?;
        Ok(Self { provider: provider.erased(), url: url.to_string() })
    }
}

#[async_trait]
impl ChainSource for RpcChainSource {
    async fn subscribe_heads(&self) -> Result<HeadStream, SourceError> {
        let subscription = self.provider.subscribe_blocks().await.map_err(SourceError::rpc)?;
        debug!(target: "blockwatch::chain", url = %self.url, "Subscribed to new heads");
        Ok(subscription.into_stream().map(|header| Ok(header.inner.number)).boxed())
    }

    async fn fetch_block(&self, height: u64) -> Result<BlockWithReceipts, SourceError> {
        trace!(target: "blockwatch::chain", block = height, "Fetching block with receipts");

        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(height))
            .full()
            .await
            .map_err(SourceError::rpc)?
            .ok_or(SourceError::BlockNotFound(height))?;
        let receipts = self
            .provider
            .get_block_receipts(BlockId::number(height))
            .await
            .map_err(SourceError::rpc)?
            .ok_or(SourceError::BlockNotFound(height))?;

        block_with_receipts(block, receipts)
    }
}

/// Join a block's transactions with their receipts
fn block_with_receipts(
    block: Block,
    receipts: Vec<TransactionReceipt>,
) -> Result<BlockWithReceipts, SourceError> {
    let number = block.header.inner.number;
    let mut receipts: HashMap<B256, TransactionReceipt> =
        receipts.into_iter().map(|receipt| (receipt.transaction_hash, receipt)).collect();

    let mut transactions = Vec::with_capacity(block.transactions.len());
    for (position, tx) in block.transactions.txns().enumerate() {
        let hash = TransactionResponse::tx_hash(tx);
        let receipt = receipts.remove(&hash).ok_or(SourceError::MissingReceipt { block: number, tx: hash })?;

        transactions.push(TxWithReceipt {
            hash,
            index: TransactionResponse::transaction_index(tx).unwrap_or(position as u64),
            from: TransactionResponse::from(tx),
            to: alloy_consensus::Transaction::to(tx),
            gas_price: receipt.effective_gas_price,
            gas_used: ReceiptResponse::gas_used(&receipt),
            has_input: !alloy_consensus::Transaction::input(tx).is_empty(),
            success: ReceiptResponse::status(&receipt),
        });
    }

    Ok(BlockWithReceipts::new(
        number,
        block.header.hash,
        block.header.inner.beneficiary,
        block.header.inner.timestamp,
    )
    .with_transactions(transactions))
}
