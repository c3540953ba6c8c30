//! Block checker trait and the relay-backed implementation

use crate::{
    CheckError, SeverityThresholds,
    miners::miner_name,
    rules::{check_bundle_fees, check_bundle_ordering, check_lowest_fee},
};
use async_trait::async_trait;
use blockwatch_primitives::{BlockCheck, BlockWithReceipts, ErrorKind, Severity};
use blockwatch_relay::{GetBlocksOptions, GetBlocksResponse, RelayApi};
use std::sync::Arc;
use tracing::{debug, trace};

/// Checks a single block for bundle anomalies
#[async_trait]
pub trait BlockChecker: Send + Sync {
    /// Check `block`.
    ///
    /// An error with [`CheckError::is_retryable`] set means the block should
    /// stay queued and be checked again later.
    async fn check_block(&self, block: &BlockWithReceipts) -> Result<BlockCheck, CheckError>;
}

#[async_trait]
impl<T: BlockChecker + ?Sized> BlockChecker for Arc<T> {
    async fn check_block(&self, block: &BlockWithReceipts) -> Result<BlockCheck, CheckError> {
        (**self).check_block(block).await
    }
}

/// [`BlockChecker`] comparing the chain's block with the relay's record of it
#[derive(Debug, Clone)]
pub struct FlashbotsBlockChecker<R> {
    relay: R,
    thresholds: SeverityThresholds,
}

impl<R: RelayApi> FlashbotsBlockChecker<R> {
    /// Create a checker with the default thresholds
    pub fn new(relay: R) -> Self {
        Self { relay, thresholds: SeverityThresholds::default() }
    }

    /// Query the relay for `number`, rejecting answers about other blocks
    async fn relay_blocks(&self, number: u64) -> Result<GetBlocksResponse, CheckError> {
        let response = self.relay.get_blocks(&GetBlocksOptions::at_block(number)).await?;
        match response.blocks.len() {
            0 => Ok(response),
            1 if response.blocks[0].block_number != number => Err(CheckError::BlockMismatch {
                requested: number,
                returned: response.blocks[0].block_number,
            }),
            1 => Ok(response),
            count => Err(CheckError::UnexpectedBlockCount { block: number, count }),
        }
    }
}

#[async_trait]
impl<R: RelayApi> BlockChecker for FlashbotsBlockChecker<R> {
    async fn check_block(&self, block: &BlockWithReceipts) -> Result<BlockCheck, CheckError> {
        trace!(target: "blockwatch::checker", block = block.number, "Checking block");

        let response = self.relay_blocks(block.number).await?;
        let bundle_hashes = response.bundle_tx_hashes();

        let mut check =
            BlockCheck::new(block.number, block.miner).with_miner_name(miner_name(&block.miner));
        check.tx_count = block.tx_count();
        check.bundle_tx_count =
            block.transactions.iter().filter(|tx| bundle_hashes.contains(&tx.hash)).count();

        let relay_block = response.blocks.first();
        for tx in block.failed_transactions() {
            match relay_block.and_then(|b| b.bundle_index_of(&tx.hash)) {
                Some(bundle) => check.report(
                    ErrorKind::FailedFlashbotsTx,
                    Severity::Serious,
                    format!("failed Flashbots tx {} in bundle {bundle} (from {})", tx.hash, tx.from),
                ),
                None if tx.is_failed_zero_gas() => check.report(
                    ErrorKind::Failed0GasTx,
                    Severity::LessSerious,
                    format!("failed 0-gas tx {} (from {})", tx.hash, tx.from),
                ),
                None => {}
            }
        }

        if let Some(relay_block) = relay_block {
            let bundles = relay_block.bundles();
            let lowest_non_bundle_gas_price = block
                .transactions
                .iter()
                .filter(|tx| !bundle_hashes.contains(&tx.hash))
                .map(|tx| tx.gas_price)
                .min();

            check_bundle_fees(&bundles, &mut check);
            check_bundle_ordering(&bundles, &self.thresholds, &mut check);
            check_lowest_fee(&bundles, lowest_non_bundle_gas_price, &self.thresholds, &mut check);
            check.bundles = bundles;
        }

        debug!(
            target: "blockwatch::checker",
            block = block.number,
            bundles = check.bundles.len(),
            findings = check.findings().len(),
            severity = ?check.severity(),
            "Block checked"
        );
        Ok(check)
    }
}
