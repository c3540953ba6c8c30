//! Blockwatch Primitives
//!
//! Shared types for the blockwatch bundle anomaly watcher:
//! - Blocks fetched from the chain together with their receipts
//! - Bundle summaries built from the relay's record of a block
//! - Findings, severities and per-kind error counters produced by a block check
//!
//! # Check flow
//!
//! ```text
//! BlockWithReceipts ──► block checker ──► BlockCheck ──► CheckOutcome
//!                                            │              │
//!                                            │              ├── Clean
//!                                            │              ├── LessSerious
//!                                            │              └── Serious
//!                                            │
//!                                            └── findings + ErrorCounts
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod block;
pub mod bundle;
pub mod check;
pub mod report;

pub use block::{BlockWithReceipts, TxWithReceipt};
pub use bundle::BundleSummary;
pub use check::{BlockCheck, CheckOutcome, ErrorCounts, ErrorKind, Finding, Severity};
pub use report::{format_eth, format_gwei};
