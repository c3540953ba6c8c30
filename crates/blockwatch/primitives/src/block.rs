//! Blocks fetched from the chain with their transaction receipts.

use alloy_primitives::{Address, B256};

/// A transaction joined with the outcome recorded in its receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxWithReceipt {
    /// Transaction hash
    pub hash: B256,
    /// Position within the block
    pub index: u64,
    /// Sender address
    pub from: Address,
    /// Recipient (`None` for contract creations)
    pub to: Option<Address>,
    /// Effective gas price paid, in wei
    pub gas_price: u128,
    /// Gas consumed according to the receipt
    pub gas_used: u64,
    /// Whether the transaction carries calldata
    pub has_input: bool,
    /// Receipt status
    pub success: bool,
}

impl TxWithReceipt {
    /// Whether this is a failed transaction that paid no gas price.
    ///
    /// These are almost always bundle transactions paying the miner via a
    /// coinbase transfer instead of through the gas price.
    pub const fn is_failed_zero_gas(&self) -> bool {
        !self.success && self.gas_price == 0 && self.has_input
    }
}

/// A block together with all of its transactions and receipts.
///
/// Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockWithReceipts {
    /// Block height
    pub number: u64,
    /// Block hash
    pub hash: B256,
    /// Producer (coinbase / beneficiary) of the block
    pub miner: Address,
    /// Block timestamp in seconds
    pub timestamp: u64,
    /// Transactions in block order
    pub transactions: Vec<TxWithReceipt>,
}

impl BlockWithReceipts {
    /// Create an empty block record
    pub const fn new(number: u64, hash: B256, miner: Address, timestamp: u64) -> Self {
        Self { number, hash, miner, timestamp, transactions: Vec::new() }
    }

    /// Attach the block's transactions
    pub fn with_transactions(mut self, transactions: Vec<TxWithReceipt>) -> Self {
        self.transactions = transactions;
        self
    }

    /// Number of transactions in the block
    pub const fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    /// Transactions whose receipt reports failure
    pub fn failed_transactions(&self) -> impl Iterator<Item = &TxWithReceipt> {
        self.transactions.iter().filter(|tx| !tx.success)
    }

    /// Single line summary used for per-block progress output
    pub fn summary(&self) -> String {
        format!(
            "block {} | {} | miner {} | tx: {} | failed: {}",
            self.number,
            self.hash,
            self.miner,
            self.tx_count(),
            self.failed_transactions().count()
        )
    }
}
