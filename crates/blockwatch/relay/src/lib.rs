//! Flashbots Blocks API Client
//!
//! The relay keeps its own record of which transactions in a block were
//! submitted as bundles. That record lags the chain head by a few blocks, so
//! every response also carries the latest block number the relay has indexed.
//!
//! # Usage
//!
//! ```ignore
//! use blockwatch_relay::{GetBlocksOptions, HttpRelayClient, RelayApi};
//!
//! let relay = HttpRelayClient::new(HttpRelayClient::DEFAULT_URL)?;
//! let response = relay.get_blocks(&GetBlocksOptions::at_block(13_000_000)).await?;
//! println!("relay indexed up to {}", response.latest_block_number);
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod client;
mod error;
pub mod types;

pub use client::{HttpRelayClient, RelayApi};
pub use error::RelayError;
pub use types::{BundleType, GetBlocksOptions, GetBlocksResponse, RelayBlock, RelayTransaction};
