//! Request and response types of the Flashbots blocks API

use alloy_primitives::{Address, B256};
use blockwatch_primitives::BundleSummary;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use std::collections::{BTreeMap, HashSet};

/// Query parameters for `GET /v1/blocks`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GetBlocksOptions {
    /// Only return the block at this height
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Only return blocks produced by this miner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miner: Option<Address>,
    /// Only return blocks containing bundles sent from this address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Only return blocks below this height
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<u64>,
    /// Maximum number of blocks to return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl GetBlocksOptions {
    /// Query a single block height
    pub const fn at_block(block_number: u64) -> Self {
        Self { block_number: Some(block_number), miner: None, from: None, before: None, limit: None }
    }

    /// Query the most recent `limit` blocks
    pub const fn recent(limit: u64) -> Self {
        Self { block_number: None, miner: None, from: None, before: None, limit: Some(limit) }
    }
}

/// Origin of a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    /// Submitted through the relay
    Flashbots,
    /// Zero gas price transaction not submitted through the relay
    Rogue,
    /// Submitted through `MistX`
    Mistx,
    /// Any type this client does not know about
    #[serde(other)]
    Unknown,
}

/// One bundle transaction as recorded by the relay
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayTransaction {
    /// Transaction hash
    pub transaction_hash: B256,
    /// Position within the block
    pub tx_index: u64,
    /// Origin of the bundle
    pub bundle_type: BundleType,
    /// Position of the bundle within the block
    pub bundle_index: u64,
    /// Height of the block
    pub block_number: u64,
    /// Sender
    pub eoa_address: Address,
    /// Recipient
    #[serde(default)]
    pub to_address: Option<Address>,
    /// Gas used by the transaction
    pub gas_used: u64,
    /// Gas price in wei
    #[serde_as(as = "DisplayFromStr")]
    pub gas_price: u128,
    /// Direct payment to the block's coinbase, in wei
    #[serde_as(as = "DisplayFromStr")]
    pub coinbase_transfer: i128,
    /// Gas fees plus coinbase transfer, in wei
    #[serde_as(as = "DisplayFromStr")]
    pub total_miner_reward: i128,
}

/// A block as recorded by the relay
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayBlock {
    /// Block height
    pub block_number: u64,
    /// Producer of the block
    pub miner: Address,
    /// Total reward the miner received from bundles, in wei
    #[serde_as(as = "DisplayFromStr")]
    pub miner_reward: i128,
    /// Total coinbase transfers from bundles, in wei
    #[serde_as(as = "DisplayFromStr")]
    pub coinbase_transfers: i128,
    /// Gas used by bundle transactions
    pub gas_used: u64,
    /// Average gas price of bundle transactions, in wei
    #[serde_as(as = "DisplayFromStr")]
    pub gas_price: i128,
    /// Bundle transactions in block order
    #[serde(default)]
    pub transactions: Vec<RelayTransaction>,
}

impl RelayBlock {
    /// Group the block's transactions by bundle, ordered by bundle index
    pub fn bundles(&self) -> Vec<BundleSummary> {
        let mut bundles: BTreeMap<u64, BundleSummary> = BTreeMap::new();
        for tx in &self.transactions {
            let bundle = bundles.entry(tx.bundle_index).or_insert(BundleSummary {
                index: tx.bundle_index,
                tx_count: 0,
                gas_used: 0,
                total_miner_reward: 0,
            });
            bundle.tx_count += 1;
            bundle.gas_used = bundle.gas_used.saturating_add(tx.gas_used);
            bundle.total_miner_reward = bundle.total_miner_reward.saturating_add(tx.total_miner_reward);
        }
        bundles.into_values().collect()
    }

    /// Bundle index of `hash`, if it is a bundle transaction of this block
    pub fn bundle_index_of(&self, hash: &B256) -> Option<u64> {
        self.transactions.iter().find(|tx| &tx.transaction_hash == hash).map(|tx| tx.bundle_index)
    }
}

/// Response of `GET /v1/blocks`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBlocksResponse {
    /// Matching blocks
    #[serde(default)]
    pub blocks: Vec<RelayBlock>,
    /// Highest block height the relay has fully indexed
    pub latest_block_number: u64,
}

impl GetBlocksResponse {
    /// Hashes of all bundle transactions in the returned blocks
    pub fn bundle_tx_hashes(&self) -> HashSet<B256> {
        self.blocks.iter().flat_map(|b| &b.transactions).map(|tx| tx.transaction_hash).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"{
        "blocks": [
            {
                "block_number": 12006599,
                "miner_reward": "1500000000000000",
                "miner": "0xea674fdde714fd979de3edf0f56aa9716b898ec8",
                "coinbase_transfers": "0",
                "gas_used": 63000,
                "gas_price": "23809523809",
                "transactions": [
                    {
                        "transaction_hash": "0x1111111111111111111111111111111111111111111111111111111111111111",
                        "tx_index": 0,
                        "bundle_type": "flashbots",
                        "bundle_index": 0,
                        "block_number": 12006599,
                        "eoa_address": "0x2222222222222222222222222222222222222222",
                        "to_address": "0x3333333333333333333333333333333333333333",
                        "gas_used": 21000,
                        "gas_price": "50000000000",
                        "coinbase_transfer": "0",
                        "total_miner_reward": "1050000000000000"
                    },
                    {
                        "transaction_hash": "0x4444444444444444444444444444444444444444444444444444444444444444",
                        "tx_index": 1,
                        "bundle_type": "flashbots",
                        "bundle_index": 0,
                        "block_number": 12006599,
                        "eoa_address": "0x2222222222222222222222222222222222222222",
                        "to_address": null,
                        "gas_used": 21000,
                        "gas_price": "0",
                        "coinbase_transfer": "0",
                        "total_miner_reward": "0"
                    },
                    {
                        "transaction_hash": "0x5555555555555555555555555555555555555555555555555555555555555555",
                        "tx_index": 2,
                        "bundle_type": "rogue",
                        "bundle_index": 1,
                        "block_number": 12006599,
                        "eoa_address": "0x6666666666666666666666666666666666666666",
                        "to_address": "0x3333333333333333333333333333333333333333",
                        "gas_used": 21000,
                        "gas_price": "0",
                        "coinbase_transfer": "450000000000000",
                        "total_miner_reward": "450000000000000"
                    }
                ]
            }
        ],
        "latest_block_number": 12006605
    }"#;

    #[test]
    fn test_decode_response() {
        let response: GetBlocksResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
        assert_eq!(response.latest_block_number, 12_006_605);
        assert_eq!(response.blocks.len(), 1);

        let block = &response.blocks[0];
        assert_eq!(block.block_number, 12_006_599);
        assert_eq!(block.miner_reward, 1_500_000_000_000_000);
        assert_eq!(block.transactions[1].to_address, None);
        assert_eq!(block.transactions[2].bundle_type, BundleType::Rogue);
    }

    #[test]
    fn test_bundle_grouping() {
        let response: GetBlocksResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
        let bundles = response.blocks[0].bundles();

        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].index, 0);
        assert_eq!(bundles[0].tx_count, 2);
        assert_eq!(bundles[0].gas_used, 42_000);
        assert_eq!(bundles[0].total_miner_reward, 1_050_000_000_000_000);
        assert_eq!(bundles[1].effective_gas_price(), 450_000_000_000_000 / 21_000);
    }

    #[test]
    fn test_tx_membership() {
        let response: GetBlocksResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
        let hashes = response.bundle_tx_hashes();

        assert!(hashes.contains(&B256::repeat_byte(0x44)));
        assert!(!hashes.contains(&B256::repeat_byte(0x99)));
        assert_eq!(response.blocks[0].bundle_index_of(&B256::repeat_byte(0x55)), Some(1));
        assert_eq!(hashes.len(), 3);
    }

    #[test]
    fn test_unknown_bundle_type() {
        let ty: BundleType = serde_json::from_str(r#""something-new""#).unwrap();
        assert_eq!(ty, BundleType::Unknown);
    }

    #[test]
    fn test_empty_blocks_field() {
        let response: GetBlocksResponse =
            serde_json::from_str(r#"{"latest_block_number": 7}"#).unwrap();
        assert!(response.blocks.is_empty());
        assert_eq!(response.latest_block_number, 7);
    }
}
