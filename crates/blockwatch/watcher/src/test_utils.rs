//! Scripted collaborators for driving the loop in tests

use crate::{ChainSource, HeadStream, NotifyError, Notifier, SourceError};
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use blockwatch_checker::{BlockChecker, CheckError};
use blockwatch_primitives::{BlockCheck, BlockWithReceipts, ErrorKind, Severity};
use blockwatch_relay::{GetBlocksOptions, GetBlocksResponse, RelayApi, RelayError};
use futures::StreamExt;
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

pub(crate) const MINER: Address = Address::repeat_byte(0xee);

pub(crate) fn test_block(number: u64) -> BlockWithReceipts {
    BlockWithReceipts::new(number, B256::with_last_byte(number as u8), MINER, number * 12)
}

pub(crate) fn clean_check(number: u64) -> BlockCheck {
    BlockCheck::new(number, MINER)
}

pub(crate) fn less_serious_check(number: u64) -> BlockCheck {
    let mut check = clean_check(number);
    check.report(ErrorKind::Failed0GasTx, Severity::LessSerious, "failed 0-gas tx");
    check
}

pub(crate) fn zero_fee_check(number: u64) -> BlockCheck {
    let mut check = clean_check(number);
    check.report(ErrorKind::BundleHas0Fee, Severity::Serious, "bundle 0 has 0 effective-gas-price");
    check
}

fn decode_error() -> serde_json::Error {
    serde_json::from_str::<u64>("-").unwrap_err()
}

/// Relay reporting a fixed latest height, or scripted failures first
#[derive(Debug)]
pub(crate) struct ScriptedRelay {
    latest: Mutex<u64>,
    failures: AtomicUsize,
    queries: AtomicUsize,
}

impl ScriptedRelay {
    pub(crate) const fn at(latest: u64) -> Self {
        Self { latest: Mutex::new(latest), failures: AtomicUsize::new(0), queries: AtomicUsize::new(0) }
    }

    pub(crate) fn set_latest(&self, latest: u64) {
        *self.latest.lock().unwrap() = latest;
    }

    /// Fail the next `n` queries
    pub(crate) fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub(crate) fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelayApi for ScriptedRelay {
    async fn get_blocks(&self, _options: &GetBlocksOptions) -> Result<GetBlocksResponse, RelayError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(RelayError::Decode(decode_error()))
        }
        Ok(GetBlocksResponse { blocks: Vec::new(), latest_block_number: *self.latest.lock().unwrap() })
    }
}

/// Checker returning scripted results per height, clean by default
#[derive(Debug, Default)]
pub(crate) struct ScriptedChecker {
    results: Mutex<HashMap<u64, VecDeque<Result<BlockCheck, CheckError>>>>,
    calls: Mutex<Vec<u64>>,
    delay: Option<Duration>,
}

impl ScriptedChecker {
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn push(&self, height: u64, result: Result<BlockCheck, CheckError>) {
        self.results.lock().unwrap().entry(height).or_default().push_back(result);
    }

    pub(crate) fn calls(&self) -> Vec<u64> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlockChecker for ScriptedChecker {
    async fn check_block(&self, block: &BlockWithReceipts) -> Result<BlockCheck, CheckError> {
        self.calls.lock().unwrap().push(block.number);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.results.lock().unwrap().get_mut(&block.number).and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| Ok(clean_check(block.number)))
    }
}

/// Notifier remembering every message
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    attempts: AtomicUsize,
    failing: bool,
}

impl RecordingNotifier {
    pub(crate) fn failing() -> Self {
        Self { failing: true, ..Default::default() }
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(NotifyError::Encode(decode_error()))
        }
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// In-memory chain serving [`test_block`] for every height
#[derive(Debug, Default)]
pub(crate) struct MockChainSource {
    subscriptions: Mutex<VecDeque<Vec<Result<u64, SourceError>>>>,
    fetch_failures: Mutex<HashMap<u64, usize>>,
    fetches: Mutex<Vec<u64>>,
}

impl MockChainSource {
    /// Queue a subscription yielding `heads`, then ending
    pub(crate) fn push_subscription(&self, heads: Vec<Result<u64, SourceError>>) {
        self.subscriptions.lock().unwrap().push_back(heads);
    }

    /// Fail the next `n` fetches of `height`
    pub(crate) fn fail_fetch(&self, height: u64, n: usize) {
        self.fetch_failures.lock().unwrap().insert(height, n);
    }

    pub(crate) fn fetches(&self) -> Vec<u64> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainSource for MockChainSource {
    async fn subscribe_heads(&self) -> Result<HeadStream, SourceError> {
        let heads = self.subscriptions.lock().unwrap().pop_front().ok_or(SourceError::SubscriptionClosed)?;
        Ok(futures::stream::iter(heads).boxed())
    }

    async fn fetch_block(&self, height: u64) -> Result<BlockWithReceipts, SourceError> {
        self.fetches.lock().unwrap().push(height);
        let mut failures = self.fetch_failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(&height).filter(|n| **n > 0) {
            *remaining -= 1;
            return Err(SourceError::BlockNotFound(height))
        }
        Ok(test_block(height))
    }
}
