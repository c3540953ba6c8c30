//! Blockwatch Binary
//!
//! Checks new Ethereum blocks against the Flashbots relay's record of their
//! bundles and reports anomalies.
//!
//! Usage:
//!
//! ```text
//! blockwatch --eth ws://localhost:8546 --block 12006599
//! blockwatch --eth ws://localhost:8546 --watch --discord
//! blockwatch --recent 10000
//! ```

#![allow(missing_docs)]

mod args;
mod chain;
mod recent;

use args::Args;
use blockwatch_checker::{BlockChecker, FlashbotsBlockChecker};
use blockwatch_relay::HttpRelayClient;
use blockwatch_watcher::{
    ChainSource, CheckDispatcher, DiscordWebhook, NotificationSink, ReconciliationLoop,
};
use chain::RpcChainSource;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();

    run(Args::parse()).await
}

async fn run(args: Args) -> eyre::Result<()> {
    // fail on a missing webhook or node before connecting anywhere
    let webhook = args.notification_config().validate()?.map(DiscordWebhook::new).transpose()?;
    let eth = args.eth_endpoint()?;

    if let Some(addr) = args.metrics {
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        info!(target: "blockwatch::cli", %addr, "Serving metrics");
    }

    let relay = HttpRelayClient::new(&args.relay_url)?;

    if let Some(limit) = args.recent {
        recent::check_recent_bundles(&relay, limit).await?;
    }

    let Some(eth) = eth else { return Ok(()) };
    info!(target: "blockwatch::cli", url = eth, "Connecting to node");
    let source = RpcChainSource::connect(eth).await?;
    info!(target: "blockwatch::cli", "Connected");

    let checker = FlashbotsBlockChecker::new(relay.clone());

    if let Some(height) = args.block {
        let block = source.fetch_block(height).await?;
        if !args.silent {
            println!("{}", block.summary());
        }
        match checker.check_block(&block).await {
            Ok(check) => print!("{}", check.render(false)),
            Err(err) => error!(target: "blockwatch::cli", block = height, %err, "Check at height error"),
        }
    }

    if args.watch {
        let sink = NotificationSink::new(webhook);
        if sink.is_enabled() {
            info!(target: "blockwatch::cli", "Sending serious findings to Discord");
        }
        let dispatcher = CheckDispatcher::new(checker, sink);
        ReconciliationLoop::new(source, relay, dispatcher, args.watcher_config()).run().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_eth_is_fatal() {
        let mut args = Args::try_parse_from(["blockwatch"]).unwrap();
        args.eth = None;

        let err = run(args).await.unwrap_err();
        assert!(err.to_string().contains("--eth"));
    }
}
