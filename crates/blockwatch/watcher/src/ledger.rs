//! Per-miner accumulation of findings

use alloy_primitives::Address;
use blockwatch_primitives::{BlockCheck, ErrorCounts};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

/// Findings accumulated for one miner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinerErrorEntry {
    /// Miner address
    pub miner: Address,
    /// Display name, if known
    pub name: Option<String>,
    /// Distinct heights with findings
    pub blocks: BTreeSet<u64>,
    /// Findings per kind, summed over all recorded checks
    pub counts: ErrorCounts,
}

impl MinerErrorEntry {
    fn new(miner: Address) -> Self {
        Self { miner, name: None, blocks: BTreeSet::new(), counts: ErrorCounts::default() }
    }

    /// Miner address followed by its display name, if known
    pub fn miner_info(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({name})", self.miner),
            None => self.miner.to_string(),
        }
    }
}

impl fmt::Display for MinerErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<66} blocks={} \t {}", self.miner_info(), self.blocks.len(), self.counts)
    }
}

/// Process-lifetime finding totals per miner, ordered by address
#[derive(Debug, Default)]
pub struct MinerErrorLedger {
    entries: BTreeMap<Address, MinerErrorEntry>,
}

impl MinerErrorLedger {
    /// Create an empty ledger
    pub const fn new() -> Self {
        Self { entries: BTreeMap::new() }
    }

    /// Add the findings of one block.
    ///
    /// Counts are always added, even for a height that was already recorded.
    /// The first non-empty `name` becomes the miner's display name.
    pub fn record(&mut self, miner: Address, name: Option<&str>, height: u64, counts: &ErrorCounts) {
        let entry = self.entries.entry(miner).or_insert_with(|| MinerErrorEntry::new(miner));
        if entry.name.is_none() {
            entry.name = name.filter(|n| !n.is_empty()).map(str::to_string);
        }
        entry.blocks.insert(height);
        entry.counts += counts;
    }

    /// Add the findings of a block check
    pub fn record_check(&mut self, check: &BlockCheck) {
        self.record(check.miner, check.miner_name.as_deref(), check.number, check.counts());
    }

    /// Entry for `miner`
    pub fn get(&self, miner: &Address) -> Option<&MinerErrorEntry> {
        self.entries.get(miner)
    }

    /// All entries, ordered by miner address
    pub fn entries(&self) -> impl Iterator<Item = &MinerErrorEntry> {
        self.entries.values()
    }

    /// Number of miners with findings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One line per miner, ordered by address
    pub fn report(&self) -> String {
        self.entries.values().map(|entry| format!("{entry}\n")).collect()
    }
}
