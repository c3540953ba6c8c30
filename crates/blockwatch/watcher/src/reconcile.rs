//! The reconciliation loop

use crate::{
    Backlog, ChainSource, CheckDispatcher, HeadStream, Notifier, SourceError, WatchError,
    WatcherConfig, metrics::WatcherMetrics,
};
use backon::{BackoffBuilder, Retryable};
use blockwatch_checker::BlockChecker;
use blockwatch_primitives::BlockWithReceipts;
use blockwatch_relay::RelayApi;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Result of one reconciliation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Latest height indexed by the relay, `None` if the relay query failed
    pub confirmed: Option<u64>,
    /// Heights checked and removed from the backlog, in order
    pub released: Vec<u64>,
    /// Height whose check will be retried next cycle
    pub deferred: Option<u64>,
}

/// Queues every new block and checks queued blocks once the relay has
/// indexed them.
///
/// Owns the [`Backlog`] and, through the dispatcher, the miner ledger. Both
/// are only touched from the task running the loop.
#[derive(Debug)]
pub struct ReconciliationLoop<S, R, C, N> {
    source: S,
    relay: R,
    dispatcher: CheckDispatcher<C, N>,
    backlog: Backlog,
    config: WatcherConfig,
    last_head: Option<u64>,
    metrics: WatcherMetrics,
}

impl<S, R, C, N> ReconciliationLoop<S, R, C, N>
where
    S: ChainSource,
    R: RelayApi,
    C: BlockChecker,
    N: Notifier,
{
    /// Create a loop with an empty backlog
    pub fn new(source: S, relay: R, dispatcher: CheckDispatcher<C, N>, config: WatcherConfig) -> Self {
        let dispatcher = dispatcher.with_call_timeout(config.call_timeout);
        Self {
            source,
            relay,
            dispatcher,
            backlog: Backlog::new(),
            config,
            last_head: None,
            metrics: WatcherMetrics::default(),
        }
    }

    /// Blocks waiting for the relay
    pub const fn backlog(&self) -> &Backlog {
        &self.backlog
    }

    /// Mutable access to the backlog
    pub const fn backlog_mut(&mut self) -> &mut Backlog {
        &mut self.backlog
    }

    /// The dispatcher and its accumulated state
    pub const fn dispatcher(&self) -> &CheckDispatcher<C, N> {
        &self.dispatcher
    }

    /// Fetch the block at `height` and queue it.
    ///
    /// Fetching is retried with backoff; running out of retries is fatal.
    pub async fn enqueue(&mut self, height: u64) -> Result<(), WatchError> {
        let block = self.fetch_block(height).await?;
        if !self.config.silent {
            println!("Queueing new block {height}");
        }
        self.backlog.insert(height, block);
        self.update_backlog_gauge();
        Ok(())
    }

    /// Check every queued block the relay has indexed as of the query for
    /// height `at`.
    ///
    /// A failed relay query skips the cycle and leaves the backlog untouched.
    /// A retryable check error keeps that block and every block after it
    /// queued until the next cycle.
    pub async fn reconcile(&mut self, at: u64) -> Reconciled {
        let mut reconciled = Reconciled::default();

        let latest = tokio::time::timeout(self.config.call_timeout, self.relay.latest_block_number(at))
            .await;
        let confirmed = match latest {
            Ok(Ok(confirmed)) => confirmed,
            Ok(Err(err)) => {
                self.metrics.relay_errors_total.increment(1);
                warn!(target: "blockwatch::watch", block = at, %err, "Flashbots API error");
                return reconciled
            }
            Err(_) => {
                self.metrics.relay_errors_total.increment(1);
                warn!(
                    target: "blockwatch::watch",
                    block = at,
                    timeout = ?self.config.call_timeout,
                    "Flashbots API error: request timed out"
                );
                return reconciled
            }
        };
        reconciled.confirmed = Some(confirmed);
        trace!(target: "blockwatch::watch", confirmed, backlog = self.backlog.len(), "Relay caught up");

        for height in self.backlog.releasable_heights(confirmed) {
            let Some(block) = self.backlog.get(height) else { continue };
            if !self.config.silent {
                println!("{}", block.summary());
            }

            let dispatched = match self.dispatcher.dispatch(block).await {
                Ok(dispatched) => dispatched,
                Err(err) => {
                    warn!(target: "blockwatch::watch", block = height, %err, "CheckBlock from backlog error");
                    reconciled.deferred = Some(height);
                    break
                }
            };

            self.backlog.remove(height);
            self.update_backlog_gauge();
            reconciled.released.push(height);

            if dispatched.is_serious() && !self.config.pacing.is_zero() {
                tokio::time::sleep(self.config.pacing).await;
            }
        }

        debug!(
            target: "blockwatch::watch",
            confirmed,
            released = reconciled.released.len(),
            deferred = ?reconciled.deferred,
            backlog = self.backlog.len(),
            "Reconciled backlog"
        );
        reconciled
    }

    /// Handle a new head: queue any heights skipped since the previous head,
    /// queue the head itself, then reconcile
    pub async fn process_head(&mut self, height: u64) -> Result<Reconciled, WatchError> {
        for missed in self.missed_heights(height) {
            self.enqueue(missed).await?;
        }
        self.enqueue(height).await?;
        self.last_head = Some(self.last_head.map_or(height, |last| last.max(height)));

        Ok(self.reconcile(height).await)
    }

    /// Follow new heads until the subscription can no longer be restored or
    /// a block cannot be fetched.
    pub async fn run(mut self) -> Result<(), WatchError> {
        info!(target: "blockwatch::watch", "Start watching");

        let mut reconnects = self.config.reconnect.backoff().build();
        loop {
            let err = match self.subscribe().await {
                Ok(mut heads) => {
                    info!(target: "blockwatch::watch", "Subscribed to new heads");
                    loop {
                        match heads.next().await {
                            Some(Ok(height)) => {
                                reconnects = self.config.reconnect.backoff().build();
                                self.process_head(height).await?;
                            }
                            Some(Err(err)) => break err,
                            None => break SourceError::SubscriptionClosed,
                        }
                    }
                }
                Err(err) => err,
            };

            let Some(delay) = reconnects.next() else {
                return Err(WatchError::Subscription(err))
            };
            warn!(
                target: "blockwatch::watch",
                %err,
                retry_in = ?delay,
                backlog = self.backlog.len(),
                "Head subscription lost, reconnecting"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn subscribe(&self) -> Result<HeadStream, SourceError> {
        let timeout = self.config.call_timeout;
        tokio::time::timeout(timeout, self.source.subscribe_heads())
            .await
            .unwrap_or(Err(SourceError::Timeout(timeout)))
    }

    async fn fetch_block(&self, height: u64) -> Result<BlockWithReceipts, WatchError> {
        let timeout = self.config.call_timeout;
        let source = &self.source;

        (move || async move {
            tokio::time::timeout(timeout, source.fetch_block(height))
                .await
                .unwrap_or(Err(SourceError::Timeout(timeout)))
        })
        .retry(self.config.fetch_retry.backoff())
        .notify(|err: &SourceError, delay: Duration| {
            warn!(target: "blockwatch::watch", block = height, %err, retry_in = ?delay, "Failed to fetch block");
        })
        .await
        .map_err(|source| WatchError::Fetch { block: height, source })
    }

    /// Heights between the previous head and `height` that were never
    /// queued, capped at the most recent `gap_backfill_limit`
    fn missed_heights(&self, height: u64) -> std::ops::Range<u64> {
        let Some(last) = self.last_head else { return 0..0 };
        let start = last.saturating_add(1);
        if start >= height {
            return 0..0
        }

        let limit = self.config.gap_backfill_limit;
        let capped = start.max(height.saturating_sub(limit));
        if capped > start {
            warn!(
                target: "blockwatch::watch",
                from = start,
                to = capped - 1,
                "Gap in head sequence exceeds backfill limit, skipping heights"
            );
        }
        capped..height
    }

    fn update_backlog_gauge(&self) {
        self.metrics.backlog_blocks.set(self.backlog.len() as f64);
    }
}
