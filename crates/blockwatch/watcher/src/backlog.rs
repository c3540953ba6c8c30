//! Blocks waiting for the relay to catch up

use blockwatch_primitives::BlockWithReceipts;
use std::collections::BTreeMap;

/// Fetched blocks keyed by height, waiting until the relay has indexed them.
///
/// Entries are released in ascending height order. The backlog has no size
/// limit; its size is exported as a metric instead.
#[derive(Debug, Default)]
pub struct Backlog {
    blocks: BTreeMap<u64, BlockWithReceipts>,
}

impl Backlog {
    /// Create an empty backlog
    pub const fn new() -> Self {
        Self { blocks: BTreeMap::new() }
    }

    /// Add or replace the entry for `height`, returning the replaced block
    pub fn insert(&mut self, height: u64, block: BlockWithReceipts) -> Option<BlockWithReceipts> {
        self.blocks.insert(height, block)
    }

    /// Entries at or below `confirmed`, lowest first
    pub fn releasable(&self, confirmed: u64) -> impl Iterator<Item = (u64, &BlockWithReceipts)> {
        self.blocks.range(..=confirmed).map(|(height, block)| (*height, block))
    }

    /// Heights at or below `confirmed`, lowest first
    pub fn releasable_heights(&self, confirmed: u64) -> Vec<u64> {
        self.blocks.range(..=confirmed).map(|(height, _)| *height).collect()
    }

    /// Entry for `height`
    pub fn get(&self, height: u64) -> Option<&BlockWithReceipts> {
        self.blocks.get(&height)
    }

    /// Whether `height` is queued
    pub fn contains(&self, height: u64) -> bool {
        self.blocks.contains_key(&height)
    }

    /// Drop the entry for `height` once it has been checked
    pub fn remove(&mut self, height: u64) -> Option<BlockWithReceipts> {
        self.blocks.remove(&height)
    }

    /// Queued heights, lowest first
    pub fn heights(&self) -> impl Iterator<Item = u64> + '_ {
        self.blocks.keys().copied()
    }

    /// Highest queued height
    pub fn highest(&self) -> Option<u64> {
        self.blocks.last_key_value().map(|(height, _)| *height)
    }

    /// Number of queued blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
