//! Blockwatch Reconciliation Loop
//!
//! New blocks are fetched as soon as their header arrives, but the relay
//! only knows which of their transactions were bundles a few blocks later.
//! Blocks therefore wait in a backlog until the relay has caught up:
//!
//! ```text
//!   new head ──► fetch block ──► Backlog ◄── relay: latest indexed height
//!                                   │
//!                    heights <= latest, ascending
//!                                   ▼
//!                            CheckDispatcher ──► BlockChecker
//!                                   │
//!          ┌────────────────────────┼─────────────────────────┐
//!          ▼                        ▼                         ▼
//!        clean                less serious                 serious
//!     (no effect)          stats + ledger        report + alert + stats + ledger
//! ```
//!
//! A failed relay query skips the cycle. A retryable check failure keeps the
//! block, and every block after it, queued until the next head.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod backlog;
mod config;
mod dispatch;
mod error;
mod ledger;
mod metrics;
mod notify;
mod reconcile;
mod source;

#[cfg(test)]
mod test_utils;

pub use backlog::Backlog;
pub use config::{NotificationConfig, RetryPolicy, WatcherConfig};
pub use dispatch::{CheckDispatcher, Dispatched, FindingStats};
pub use error::{ConfigError, NotifyError, SourceError, WatchError};
pub use ledger::{MinerErrorEntry, MinerErrorLedger};
pub use notify::{DiscordWebhook, NotificationSink, Notifier};
pub use reconcile::{ReconciliationLoop, Reconciled};
pub use source::{ChainSource, HeadStream};
