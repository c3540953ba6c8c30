//! Bundle ordering scan over the relay's recent blocks

use blockwatch_checker::{SeverityThresholds, check_relay_block};
use blockwatch_primitives::ErrorCounts;
use blockwatch_relay::{GetBlocksOptions, RelayApi};
use tracing::info;

/// Check the bundles of the relay's latest `limit` blocks, oldest first
pub(crate) async fn check_recent_bundles(relay: &impl RelayApi, limit: u64) -> eyre::Result<()> {
    let mut response = relay.get_blocks(&GetBlocksOptions::recent(limit)).await?;
    response.blocks.sort_by_key(|block| block.block_number);
    info!(
        target: "blockwatch::cli",
        blocks = response.blocks.len(),
        latest = response.latest_block_number,
        "Checking recent relay blocks"
    );

    let thresholds = SeverityThresholds::default();
    let mut totals = ErrorCounts::default();
    let mut flagged = 0usize;
    for block in &response.blocks {
        let check = check_relay_block(block, &thresholds);
        if check.has_errors() {
            flagged += 1;
            totals += check.counts();
            println!("{}", check.render(false));
        }
    }

    println!("{flagged} of {} blocks with findings: {totals}", response.blocks.len());
    Ok(())
}
