//! Bundle summaries derived from the relay's record of a block.

/// Aggregate view of one bundle included in a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleSummary {
    /// Position of the bundle within the block
    pub index: u64,
    /// Number of transactions in the bundle
    pub tx_count: usize,
    /// Total gas used by the bundle's transactions
    pub gas_used: u64,
    /// Total miner reward (gas fees plus coinbase transfers), in wei.
    ///
    /// Signed: a bundle can leave the miner worse off.
    pub total_miner_reward: i128,
}

impl BundleSummary {
    /// Reward per unit of gas, in wei. Zero for bundles that used no gas.
    pub const fn effective_gas_price(&self) -> i128 {
        if self.gas_used == 0 {
            return 0;
        }
        self.total_miner_reward / self.gas_used as i128
    }

    /// Whether the miner received nothing for this bundle
    pub const fn has_zero_fee(&self) -> bool {
        self.total_miner_reward == 0
    }

    /// Whether including this bundle cost the miner
    pub const fn has_negative_fee(&self) -> bool {
        self.total_miner_reward < 0
    }
}
