//! Pure bundle pricing rules.
//!
//! These only look at bundle summaries and gas prices, so they run the same
//! way on a freshly mined block and on a historical relay record.

use crate::miners::miner_name;
use blockwatch_primitives::{BlockCheck, BundleSummary, ErrorKind, Severity, format_eth, format_gwei};
use blockwatch_relay::RelayBlock;

/// Percent deviations at which a pricing anomaly becomes reportable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityThresholds {
    /// Deviation above which a finding is serious
    pub serious_percent: f64,
    /// Deviation above which a finding is less serious
    pub less_serious_percent: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self { serious_percent: 50.0, less_serious_percent: 25.0 }
    }
}

impl SeverityThresholds {
    /// Severity of a deviation, `None` if it is within tolerance
    pub const fn classify(&self, percent: f64) -> Option<Severity> {
        if percent > self.serious_percent {
            Some(Severity::Serious)
        } else if percent > self.less_serious_percent {
            Some(Severity::LessSerious)
        } else {
            None
        }
    }
}

/// How far `value` lies from `reference`, in percent of `reference`
const fn percent_diff(value: i128, reference: i128) -> f64 {
    (value - reference).abs() as f64 / reference as f64 * 100.0
}

/// Flag bundles that pay the miner nothing or less than nothing
pub fn check_bundle_fees(bundles: &[BundleSummary], check: &mut BlockCheck) {
    for bundle in bundles {
        if bundle.has_zero_fee() {
            check.report(
                ErrorKind::BundleHas0Fee,
                Severity::Serious,
                format!("bundle {} has 0 effective-gas-price ({} tx)", bundle.index, bundle.tx_count),
            );
        } else if bundle.has_negative_fee() {
            check.report(
                ErrorKind::BundleHasNegativeFee,
                Severity::Serious,
                format!(
                    "bundle {} has negative miner reward ({})",
                    bundle.index,
                    format_eth(bundle.total_miner_reward)
                ),
            );
        }
    }
}

/// Flag bundles paying a higher effective gas price than the bundle before
/// them. Bundles are expected to be ordered by price, highest first.
pub fn check_bundle_ordering(
    bundles: &[BundleSummary],
    thresholds: &SeverityThresholds,
    check: &mut BlockCheck,
) {
    for pair in bundles.windows(2) {
        let (prev, current) = (&pair[0], &pair[1]);
        let (prev_price, price) = (prev.effective_gas_price(), current.effective_gas_price());
        if prev_price <= 0 || price <= prev_price {
            continue;
        }

        let percent = percent_diff(price, prev_price);
        if let Some(severity) = thresholds.classify(percent) {
            check.report(
                ErrorKind::BundlePaysMoreThanPrevBundle,
                severity,
                format!(
                    "bundle {} has {percent:.2}% higher effective-gas-price ({}) than previous bundle {} ({})",
                    current.index,
                    format_gwei(price),
                    prev.index,
                    format_gwei(prev_price),
                ),
            );
        }
    }
}

/// Flag bundles paying less than the cheapest transaction outside any bundle
pub fn check_lowest_fee(
    bundles: &[BundleSummary],
    lowest_non_bundle_gas_price: Option<u128>,
    thresholds: &SeverityThresholds,
    check: &mut BlockCheck,
) {
    let Some(lowest) = lowest_non_bundle_gas_price.and_then(|p| i128::try_from(p).ok()) else {
        return
    };
    if lowest == 0 {
        return
    }

    for bundle in bundles {
        let price = bundle.effective_gas_price();
        // zero and negative fees are already reported on their own
        if price <= 0 || price >= lowest {
            continue;
        }

        let percent = percent_diff(price, lowest);
        if let Some(severity) = thresholds.classify(percent) {
            check.report(
                ErrorKind::BundleHasLowerFeeThanLowestNonFbTx,
                severity,
                format!(
                    "bundle {} has {percent:.2}% lower effective-gas-price ({}) than lowest non-bundle tx ({})",
                    bundle.index,
                    format_gwei(price),
                    format_gwei(lowest),
                ),
            );
        }
    }
}

/// Check a relay block record on its own, without the chain's view of the
/// block. Used to scan the relay's history.
pub fn check_relay_block(block: &RelayBlock, thresholds: &SeverityThresholds) -> BlockCheck {
    let bundles = block.bundles();
    let mut check =
        BlockCheck::new(block.block_number, block.miner).with_miner_name(miner_name(&block.miner));
    check.tx_count = block.transactions.len();
    check.bundle_tx_count = block.transactions.len();

    check_bundle_fees(&bundles, &mut check);
    check_bundle_ordering(&bundles, thresholds, &mut check);
    check.bundles = bundles;
    check
}
