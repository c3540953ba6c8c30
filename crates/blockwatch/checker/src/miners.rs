//! Display names of well-known mining pools

use alloy_primitives::{Address, address};

/// Ethermine coinbase
pub const ETHERMINE: Address = address!("0xea674fdde714fd979de3edf0f56aa9716b898ec8");
/// `SparkPool` coinbase
pub const SPARKPOOL: Address = address!("0x5a0b54d5dc17e0aadc383d2db43b0a0d3e029c4c");
/// `F2Pool` coinbase
pub const F2POOL: Address = address!("0x829bd824b016326a401d083b33d092293333a830");
/// Hiveon coinbase
pub const HIVEON: Address = address!("0x1ad91ee08f21be3de0ba2ba6918e714da6b45836");
/// Nanopool coinbase
pub const NANOPOOL: Address = address!("0x52bc44d5378309ee2abf1539bf71de1b7d7be3b5");

const KNOWN_MINERS: [(Address, &str); 5] = [
    (ETHERMINE, "Ethermine"),
    (SPARKPOOL, "SparkPool"),
    (F2POOL, "F2Pool"),
    (HIVEON, "Hiveon"),
    (NANOPOOL, "Nanopool"),
];

/// Display name of a block producer, if known
pub fn miner_name(miner: &Address) -> Option<&'static str> {
    KNOWN_MINERS.iter().find(|(address, _)| address == miner).map(|(_, name)| *name)
}
