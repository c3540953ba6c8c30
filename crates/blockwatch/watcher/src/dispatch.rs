//! Running checks and acting on their outcome

use crate::{MinerErrorLedger, NotificationSink, Notifier, metrics::WatcherMetrics};
use blockwatch_checker::{BlockChecker, CheckError};
use blockwatch_primitives::{BlockWithReceipts, CheckOutcome, Severity};
use std::{fmt, time::Duration};
use tracing::{debug, warn};

/// Number of checks per outcome over the process lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindingStats {
    /// Checks with a serious finding
    pub serious: u64,
    /// Checks whose worst finding is less serious
    pub less_serious: u64,
}

impl fmt::Display for FindingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stats - 50p_errors: {}, 25p_errors: {}", self.serious, self.less_serious)
    }
}

/// What happened to a block handed to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// The check completed, with the severity of its worst finding
    Checked(Option<Severity>),
    /// The check failed in a way retrying will not fix
    Abandoned,
}

impl Dispatched {
    /// Whether the block produced an alert-worthy finding
    pub const fn is_serious(&self) -> bool {
        matches!(self, Self::Checked(Some(Severity::Serious)))
    }
}

/// Checks blocks and routes findings to the ledger, the terminal and the
/// notification sink.
///
/// Severity comes from the checker; the dispatcher only branches on the
/// [`CheckOutcome`].
#[derive(Debug)]
pub struct CheckDispatcher<C, N> {
    checker: C,
    sink: NotificationSink<N>,
    ledger: MinerErrorLedger,
    stats: FindingStats,
    call_timeout: Duration,
    metrics: WatcherMetrics,
}

impl<C, N> CheckDispatcher<C, N>
where
    C: BlockChecker,
    N: Notifier,
{
    /// Default upper bound for a single check
    pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a dispatcher
    pub fn new(checker: C, sink: NotificationSink<N>) -> Self {
        Self {
            checker,
            sink,
            ledger: MinerErrorLedger::new(),
            stats: FindingStats::default(),
            call_timeout: Self::DEFAULT_CALL_TIMEOUT,
            metrics: WatcherMetrics::default(),
        }
    }

    /// Set the upper bound for a single check
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Findings accumulated per miner
    pub const fn ledger(&self) -> &MinerErrorLedger {
        &self.ledger
    }

    /// Checks per outcome so far
    pub const fn stats(&self) -> FindingStats {
        self.stats
    }

    /// Check `block` and act on the outcome.
    ///
    /// Returns the error if the check should be retried later. Definitive
    /// check failures are logged and reported as [`Dispatched::Abandoned`].
    pub async fn dispatch(&mut self, block: &BlockWithReceipts) -> Result<Dispatched, CheckError> {
        let result = tokio::time::timeout(self.call_timeout, self.checker.check_block(block))
            .await
            .unwrap_or(Err(CheckError::Timeout(self.call_timeout)));

        let check = match result {
            Ok(check) => check,
            Err(err) if err.is_retryable() => {
                self.metrics.retryable_check_errors_total.increment(1);
                return Err(err)
            }
            Err(err) => {
                warn!(
                    target: "blockwatch::dispatch",
                    block = block.number,
                    %err,
                    "CheckBlock from backlog error, dropping block"
                );
                return Ok(Dispatched::Abandoned)
            }
        };

        self.metrics.blocks_checked_total.increment(1);
        Ok(self.handle(check.into_outcome()).await)
    }

    /// Act on a completed check
    pub async fn handle(&mut self, outcome: CheckOutcome) -> Dispatched {
        match outcome {
            CheckOutcome::Clean(check) => {
                debug!(target: "blockwatch::dispatch", block = check.number, "No findings");
                Dispatched::Checked(None)
            }
            CheckOutcome::LessSerious(check) => {
                self.stats.less_serious += 1;
                self.metrics.less_serious_findings_total.increment(1);
                self.ledger.record_check(&check);
                self.print_stats();
                Dispatched::Checked(Some(Severity::LessSerious))
            }
            CheckOutcome::Serious(check) => {
                self.stats.serious += 1;
                self.metrics.serious_findings_total.increment(1);
                print!("{}", check.render(false));
                self.sink.alert(&check).await;
                println!();

                self.ledger.record_check(&check);
                self.print_stats();
                Dispatched::Checked(Some(Severity::Serious))
            }
        }
    }

    fn print_stats(&self) {
        println!("{}", self.stats);
        print!("{}", self.ledger.report());
    }
}
