//! Text rendering of block check results.
//!
//! Terminal output is plain text. Markdown output adds explorer links and is
//! what gets posted to the webhook.

use crate::BlockCheck;
use std::fmt::Write;

const ETHERSCAN_URL: &str = "https://etherscan.io";
const BUNDLE_EXPLORER_URL: &str = "https://flashbots-explorer.marto.lol";

const WEI_PER_GWEI: f64 = 1e9;
const WEI_PER_ETH: f64 = 1e18;

/// Format a wei amount as gwei with two decimals
pub fn format_gwei(wei: i128) -> String {
    format!("{:.2} gwei", wei as f64 / WEI_PER_GWEI)
}

/// Format a wei amount as ether with four decimals
pub fn format_eth(wei: i128) -> String {
    format!("{:.4} ETH", wei as f64 / WEI_PER_ETH)
}

impl BlockCheck {
    /// One line identifying the block, its producer and its size
    pub fn render_header(&self, markdown: bool) -> String {
        let mut out = String::new();
        let miner = self.miner.to_string();

        if markdown {
            let _ = write!(
                out,
                "Block [{n}](<{ETHERSCAN_URL}/block/{n}>) ([bundle-explorer](<{BUNDLE_EXPLORER_URL}/?block={n}>)), miner [{miner}](<{ETHERSCAN_URL}/address/{miner}>)",
                n = self.number,
            );
        } else {
            let _ = write!(out, "Block {}, miner {miner}", self.number);
        }

        if let Some(name) = &self.miner_name {
            let _ = write!(out, " ({name})");
        }

        let _ = write!(
            out,
            " - tx: {}, bundle-tx: {}, bundles: {}",
            self.tx_count,
            self.bundle_tx_count,
            self.bundles.len()
        );
        out
    }

    /// Full multi-line report: header, one line per finding and, for the
    /// terminal, the bundle table
    pub fn render(&self, markdown: bool) -> String {
        let mut out = self.render_header(markdown);
        out.push('\n');

        for error in self.errors() {
            let _ = writeln!(out, "- {error}");
        }

        if !markdown && !self.bundles.is_empty() {
            out.push_str("bundles:\n");
            for bundle in &self.bundles {
                let _ = writeln!(
                    out,
                    "- bundle {}: tx={} \t gasUsed={} \t reward={} \t effectiveGasPrice={}",
                    bundle.index,
                    bundle.tx_count,
                    bundle.gas_used,
                    format_eth(bundle.total_miner_reward),
                    format_gwei(bundle.effective_gas_price()),
                );
            }
        }
        out
    }

    /// Header followed by the first finding on the same line
    pub fn render_short(&self, markdown: bool) -> String {
        let mut out = self.render_header(markdown);
        if let Some(error) = self.errors().next() {
            out.push_str(" - Error: ");
            out.push_str(error);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BundleSummary, ErrorKind, Severity};
    use alloy_primitives::Address;

    fn sample_check() -> BlockCheck {
        let mut check =
            BlockCheck::new(13_000_000, Address::repeat_byte(0x11)).with_miner_name(Some("Ethermine"));
        check.tx_count = 150;
        check.bundle_tx_count = 2;
        check.bundles.push(BundleSummary {
            index: 0,
            tx_count: 2,
            gas_used: 100_000,
            total_miner_reward: 0,
        });
        check.report(ErrorKind::BundleHas0Fee, Severity::Serious, "bundle 0 has 0 fee");
        check
    }

    #[test]
    fn test_plain_header() {
        let header = sample_check().render_header(false);
        assert!(header.starts_with("Block 13000000, miner 0x1111"));
        assert!(header.contains("(Ethermine)"));
        assert!(header.ends_with(" - tx: 150, bundle-tx: 2, bundles: 1"));
    }

    #[test]
    fn test_markdown_header_links() {
        let header = sample_check().render_header(true);
        assert!(header.contains("[13000000](<https://etherscan.io/block/13000000>)"));
        assert!(header.contains("https://flashbots-explorer.marto.lol/?block=13000000"));
        assert!(header.contains("https://etherscan.io/address/0x1111"));
    }

    #[test]
    fn test_full_report() {
        let report = sample_check().render(false);
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines[1], "- bundle 0 has 0 fee");
        assert_eq!(lines[2], "bundles:");
        assert!(lines[3].starts_with("- bundle 0: tx=2"));

        // no bundle table for the webhook
        assert!(!sample_check().render(true).contains("- bundle 0:"));
    }

    #[test]
    fn test_short_report() {
        let short = sample_check().render_short(true);
        assert!(short.ends_with(" - Error: bundle 0 has 0 fee"));
        assert!(!short.contains('\n'));
    }

    #[test]
    fn test_unit_formatting() {
        assert_eq!(format_gwei(50_000_000_000), "50.00 gwei");
        assert_eq!(format_eth(5_000_000_000_000_000), "0.0050 ETH");
        assert_eq!(format_eth(-1_000_000_000_000_000_000), "-1.0000 ETH");
    }
}
