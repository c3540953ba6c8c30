//! Command line arguments

use blockwatch_relay::HttpRelayClient;
use blockwatch_watcher::{NotificationConfig, WatcherConfig};
use clap::Parser;
use std::{net::SocketAddr, time::Duration};

/// Watch new Ethereum blocks for Flashbots bundle anomalies
#[derive(Debug, Parser)]
#[command(name = "blockwatch", version, about)]
pub(crate) struct Args {
    /// Ethereum node URI (websocket or IPC for --watch)
    #[arg(long, env = "ETH_NODE")]
    pub(crate) eth: Option<String>,

    /// Check a single block
    #[arg(long, value_name = "HEIGHT")]
    pub(crate) block: Option<u64>,

    /// Watch and process new blocks
    #[arg(long)]
    pub(crate) watch: bool,

    /// Don't print info about every block
    #[arg(long)]
    pub(crate) silent: bool,

    /// Send serious findings to Discord
    #[arg(long)]
    pub(crate) discord: bool,

    /// Discord webhook URL
    #[arg(long, env = "DISCORD_WEBHOOK", hide_env_values = true)]
    pub(crate) discord_webhook: Option<String>,

    /// Flashbots blocks API endpoint
    #[arg(long, default_value = HttpRelayClient::DEFAULT_URL)]
    pub(crate) relay_url: String,

    /// Pause after each serious finding
    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    pub(crate) pacing: Duration,

    /// Timeout for every node, relay and check call
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub(crate) call_timeout: Duration,

    /// Most skipped heights queued when the head sequence jumps
    #[arg(long, default_value_t = 64)]
    pub(crate) gap_backfill_limit: u64,

    /// Check bundle ordering of the relay's latest LIMIT blocks
    #[arg(long, value_name = "LIMIT")]
    pub(crate) recent: Option<u64>,

    /// Serve Prometheus metrics on this address
    #[arg(long, value_name = "ADDR")]
    pub(crate) metrics: Option<SocketAddr>,
}

impl Args {
    /// Reconciliation loop settings
    pub(crate) fn watcher_config(&self) -> WatcherConfig {
        WatcherConfig {
            silent: self.silent,
            pacing: self.pacing,
            call_timeout: self.call_timeout,
            gap_backfill_limit: self.gap_backfill_limit,
            ..Default::default()
        }
    }

    /// Node endpoint, required unless the run only scans `--recent` relay blocks
    pub(crate) fn eth_endpoint(&self) -> eyre::Result<Option<&str>> {
        let only_recent = self.recent.is_some() && self.block.is_none() && !self.watch;
        match self.eth.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => Ok(Some(url)),
            None if only_recent => Ok(None),
            None => eyre::bail!("Pass a valid eth node with --eth argument or ETH_NODE env var."),
        }
    }

    /// Alert settings
    pub(crate) fn notification_config(&self) -> NotificationConfig {
        if self.discord {
            NotificationConfig::enabled(self.discord_webhook.clone())
        } else {
            NotificationConfig::disabled()
        }
    }
}
