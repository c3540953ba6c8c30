//! Blockwatch Block Checker
//!
//! Compares a block fetched from the chain with the relay's record of the
//! bundles in it and reports anomalies:
//!
//! ```text
//! Failed transactions
//! ├── failed bundle tx                         serious
//! └── failed 0-gas tx outside any bundle       less serious
//!
//! Bundle pricing (effective gas price = miner reward / gas used)
//! ├── zero fee                                 serious
//! ├── negative fee                             serious
//! ├── pays more than the previous bundle       > 50% serious, > 25% less serious
//! └── pays less than cheapest ordinary tx      > 50% serious, > 25% less serious
//! ```
//!
//! Severity is decided here and nowhere else.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod checker;
mod error;
pub mod miners;
pub mod rules;

pub use checker::{BlockChecker, FlashbotsBlockChecker};
pub use error::CheckError;
pub use miners::miner_name;
pub use rules::{SeverityThresholds, check_relay_block};
