//! Block check results: findings, severities and per-kind counters.

use crate::BundleSummary;
use alloy_primitives::Address;
use std::{fmt, ops::AddAssign};

/// Severity assigned to a finding by the block checker.
///
/// Ordered so that `Serious > LessSerious`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Lower-confidence anomaly, only counted
    LessSerious,
    /// High-confidence anomaly, reported and alerted
    Serious,
}

/// Kinds of anomalies a block check can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Failed transaction with zero gas price that is not part of a bundle
    Failed0GasTx,
    /// Failed transaction that was submitted as part of a bundle
    FailedFlashbotsTx,
    /// Bundle pays a higher effective gas price than the bundle before it
    BundlePaysMoreThanPrevBundle,
    /// Bundle pays less than the cheapest ordinary transaction in the block
    BundleHasLowerFeeThanLowestNonFbTx,
    /// Bundle pays the miner nothing
    BundleHas0Fee,
    /// Bundle costs the miner
    BundleHasNegativeFee,
}

impl ErrorKind {
    /// All kinds, in report order
    pub const ALL: [Self; 6] = [
        Self::Failed0GasTx,
        Self::FailedFlashbotsTx,
        Self::BundlePaysMoreThanPrevBundle,
        Self::BundleHasLowerFeeThanLowestNonFbTx,
        Self::BundleHas0Fee,
        Self::BundleHasNegativeFee,
    ];

    /// Short label used in stats and ledger lines
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Failed0GasTx => "failed0gas",
            Self::FailedFlashbotsTx => "failedFbTx",
            Self::BundlePaysMoreThanPrevBundle => "bundlePaysMore",
            Self::BundleHasLowerFeeThanLowestNonFbTx => "bundleTooLowFee",
            Self::BundleHas0Fee => "has0fee",
            Self::BundleHasNegativeFee => "hasNegativeFee",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Occurrence counters, one per [`ErrorKind`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ErrorCounts {
    /// See [`ErrorKind::Failed0GasTx`]
    pub failed_0_gas_tx: u64,
    /// See [`ErrorKind::FailedFlashbotsTx`]
    pub failed_flashbots_tx: u64,
    /// See [`ErrorKind::BundlePaysMoreThanPrevBundle`]
    pub bundle_pays_more_than_prev_bundle: u64,
    /// See [`ErrorKind::BundleHasLowerFeeThanLowestNonFbTx`]
    pub bundle_has_lower_fee_than_lowest_non_fb_tx: u64,
    /// See [`ErrorKind::BundleHas0Fee`]
    pub bundle_has_0_fee: u64,
    /// See [`ErrorKind::BundleHasNegativeFee`]
    pub bundle_has_negative_fee: u64,
}

impl ErrorCounts {
    const fn slot(&mut self, kind: ErrorKind) -> &mut u64 {
        match kind {
            ErrorKind::Failed0GasTx => &mut self.failed_0_gas_tx,
            ErrorKind::FailedFlashbotsTx => &mut self.failed_flashbots_tx,
            ErrorKind::BundlePaysMoreThanPrevBundle => &mut self.bundle_pays_more_than_prev_bundle,
            ErrorKind::BundleHasLowerFeeThanLowestNonFbTx => {
                &mut self.bundle_has_lower_fee_than_lowest_non_fb_tx
            }
            ErrorKind::BundleHas0Fee => &mut self.bundle_has_0_fee,
            ErrorKind::BundleHasNegativeFee => &mut self.bundle_has_negative_fee,
        }
    }

    /// Count one more occurrence of `kind`
    pub const fn increment(&mut self, kind: ErrorKind) {
        let slot = self.slot(kind);
        *slot = slot.saturating_add(1);
    }

    /// Current count for `kind`
    pub const fn get(&self, kind: ErrorKind) -> u64 {
        match kind {
            ErrorKind::Failed0GasTx => self.failed_0_gas_tx,
            ErrorKind::FailedFlashbotsTx => self.failed_flashbots_tx,
            ErrorKind::BundlePaysMoreThanPrevBundle => self.bundle_pays_more_than_prev_bundle,
            ErrorKind::BundleHasLowerFeeThanLowestNonFbTx => {
                self.bundle_has_lower_fee_than_lowest_non_fb_tx
            }
            ErrorKind::BundleHas0Fee => self.bundle_has_0_fee,
            ErrorKind::BundleHasNegativeFee => self.bundle_has_negative_fee,
        }
    }

    /// Sum over all kinds
    pub fn total(&self) -> u64 {
        ErrorKind::ALL.iter().fold(0u64, |acc, kind| acc.saturating_add(self.get(*kind)))
    }

    /// Whether every counter is zero
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl AddAssign<&Self> for ErrorCounts {
    fn add_assign(&mut self, rhs: &Self) {
        for kind in ErrorKind::ALL {
            let slot = self.slot(kind);
            *slot = slot.saturating_add(rhs.get(kind));
        }
    }
}

impl AddAssign for ErrorCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self += &rhs;
    }
}

impl fmt::Display for ErrorCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in ErrorKind::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(" \t ")?;
            }
            write!(f, "{}={}", kind.label(), self.get(*kind))?;
        }
        Ok(())
    }
}

/// A single anomaly found in a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// What went wrong
    pub kind: ErrorKind,
    /// How confident the checker is that this matters
    pub severity: Severity,
    /// Human readable description
    pub message: String,
}

impl Finding {
    /// Create a new finding
    pub fn new(kind: ErrorKind, severity: Severity, message: impl Into<String>) -> Self {
        Self { kind, severity, message: message.into() }
    }
}

/// Result of checking one block.
///
/// Findings can only be added through [`BlockCheck::push`], which keeps the
/// per-kind counters and the zero-fee flag in step with the finding list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockCheck {
    /// Height of the checked block
    pub number: u64,
    /// Producer of the block
    pub miner: Address,
    /// Display name of the producer, if known
    pub miner_name: Option<String>,
    /// Number of transactions in the block
    pub tx_count: usize,
    /// Number of transactions that belong to bundles
    pub bundle_tx_count: usize,
    /// Bundles in block order
    pub bundles: Vec<BundleSummary>,
    findings: Vec<Finding>,
    counts: ErrorCounts,
    has_bundle_with_zero_effective_gas_price: bool,
}

impl BlockCheck {
    /// Create an empty check result for a block
    pub const fn new(number: u64, miner: Address) -> Self {
        Self {
            number,
            miner,
            miner_name: None,
            tx_count: 0,
            bundle_tx_count: 0,
            bundles: Vec::new(),
            findings: Vec::new(),
            counts: ErrorCounts {
                failed_0_gas_tx: 0,
                failed_flashbots_tx: 0,
                bundle_pays_more_than_prev_bundle: 0,
                bundle_has_lower_fee_than_lowest_non_fb_tx: 0,
                bundle_has_0_fee: 0,
                bundle_has_negative_fee: 0,
            },
            has_bundle_with_zero_effective_gas_price: false,
        }
    }

    /// Set the producer display name
    pub fn with_miner_name(mut self, name: Option<impl Into<String>>) -> Self {
        self.miner_name = name.map(Into::into);
        self
    }

    /// Record a finding
    pub fn push(&mut self, finding: Finding) {
        self.counts.increment(finding.kind);
        if finding.kind == ErrorKind::BundleHas0Fee {
            self.has_bundle_with_zero_effective_gas_price = true;
        }
        self.findings.push(finding);
    }

    /// Record a finding built from its parts
    pub fn report(&mut self, kind: ErrorKind, severity: Severity, message: impl Into<String>) {
        self.push(Finding::new(kind, severity, message));
    }

    /// All findings in the order they were recorded
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Finding messages in the order they were recorded
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.findings.iter().map(|f| f.message.as_str())
    }

    /// Per-kind counters
    pub const fn counts(&self) -> &ErrorCounts {
        &self.counts
    }

    /// Whether any bundle paid the miner nothing
    pub const fn has_bundle_with_zero_effective_gas_price(&self) -> bool {
        self.has_bundle_with_zero_effective_gas_price
    }

    /// Whether the check produced any finding
    pub const fn has_errors(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Highest severity among the findings
    pub fn severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }

    /// Whether the block's only problem is a bundle paying nothing, which is
    /// alerted with a one-line message instead of the full report
    pub const fn is_single_zero_fee_bundle(&self) -> bool {
        self.findings.len() == 1 && self.has_bundle_with_zero_effective_gas_price
    }

    /// Classify the check by its highest severity
    pub fn into_outcome(self) -> CheckOutcome {
        match self.severity() {
            None => CheckOutcome::Clean(self),
            Some(Severity::LessSerious) => CheckOutcome::LessSerious(self),
            Some(Severity::Serious) => CheckOutcome::Serious(self),
        }
    }
}

/// A [`BlockCheck`] tagged with its classification.
///
/// Counting and alerting both branch on this single value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No findings
    Clean(BlockCheck),
    /// Findings, none of them serious
    LessSerious(BlockCheck),
    /// At least one serious finding
    Serious(BlockCheck),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_follow_findings() {
        let mut check = BlockCheck::new(1, Address::ZERO);
        check.report(ErrorKind::FailedFlashbotsTx, Severity::Serious, "a");
        check.report(ErrorKind::FailedFlashbotsTx, Severity::Serious, "b");
        check.report(ErrorKind::Failed0GasTx, Severity::LessSerious, "c");

        assert_eq!(check.counts().failed_flashbots_tx, 2);
        assert_eq!(check.counts().failed_0_gas_tx, 1);
        assert_eq!(check.counts().total(), 3);
        assert_eq!(check.errors().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_outcome_classification() {
        let clean = BlockCheck::new(1, Address::ZERO);
        assert!(matches!(clean.into_outcome(), CheckOutcome::Clean(_)));

        let mut less = BlockCheck::new(2, Address::ZERO);
        less.report(ErrorKind::BundlePaysMoreThanPrevBundle, Severity::LessSerious, "x");
        assert!(matches!(less.into_outcome(), CheckOutcome::LessSerious(_)));

        let mut serious = BlockCheck::new(3, Address::ZERO);
        serious.report(ErrorKind::Failed0GasTx, Severity::LessSerious, "x");
        serious.report(ErrorKind::BundleHasNegativeFee, Severity::Serious, "y");
        assert!(matches!(serious.into_outcome(), CheckOutcome::Serious(check) if check.number == 3));
    }

    #[test]
    fn test_zero_fee_flag() {
        let mut check = BlockCheck::new(1, Address::ZERO);
        assert!(!check.has_bundle_with_zero_effective_gas_price());

        check.report(ErrorKind::BundleHas0Fee, Severity::Serious, "bundle 0 has 0 fee");
        assert!(check.has_bundle_with_zero_effective_gas_price());
        assert!(check.is_single_zero_fee_bundle());

        check.report(ErrorKind::FailedFlashbotsTx, Severity::Serious, "failed");
        assert!(!check.is_single_zero_fee_bundle());
    }

    #[test]
    fn test_counts_add_assign() {
        let mut a = ErrorCounts { failed_0_gas_tx: 1, bundle_has_0_fee: 2, ..Default::default() };
        let b = ErrorCounts { failed_0_gas_tx: 3, bundle_has_negative_fee: 1, ..Default::default() };
        a += &b;

        assert_eq!(a.failed_0_gas_tx, 4);
        assert_eq!(a.bundle_has_0_fee, 2);
        assert_eq!(a.bundle_has_negative_fee, 1);
        assert_eq!(a.total(), 7);
    }

    #[test]
    fn test_counts_display() {
        let counts = ErrorCounts { failed_flashbots_tx: 5, ..Default::default() };
        assert_eq!(
            counts.to_string(),
            "failed0gas=0 \t failedFbTx=5 \t bundlePaysMore=0 \t bundleTooLowFee=0 \t has0fee=0 \t hasNegativeFee=0"
        );
    }
}
