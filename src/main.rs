//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Entry point for the limit order book. Starts a worker thread owning the book and
// either runs the built-in demo scenarios or replays a JSON-lines command script.
//--------------------------------------------------------------------------------------------------
// To run the demo: cargo run -- --demo
// To replay a script: cargo run -- --replay commands.jsonl
// Show five levels per side at the end: cargo run -- --replay commands.jsonl --depth 5
//
// Script lines look like:
//   {"type":"limit","side":"bid","price":"100","size":"5"}
//   {"type":"market","side":"ask","size":"4"}
//   {"type":"cancel","id":"00000000-0000-0000-0000-000000000001"}

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, warn};

use limit_orderbook::config::Config;
use limit_orderbook::inbounds::replay::ReplayDriver;
use limit_orderbook::logging::init_logging;
use limit_orderbook::{
    ClockIdGenerator, DepthSnapshot, OrderBook, OrderBookClient, OrderBookWorker, OrderFactory,
    OrderbookError, SequentialIdGenerator,
};

#[derive(Parser, Debug)]
#[command(name = "limit-orderbook", about = "Price-time priority limit order book")]
struct Opt {
    /// Run the built-in example scenarios
    #[arg(long)]
    demo: bool,

    /// Replay a JSON-lines command script
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Levels per side in the final depth view (overrides DEPTH_LEVELS)
    #[arg(long)]
    depth: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    let config = Config::try_from_env()
        .map_err(|e| anyhow!(e))
        .context("failed to load configuration")?;
    init_logging(&config.log_level).map_err(|e| anyhow!(e))?;

    info!(
        app_id = %config.app_id,
        channel_capacity = config.channel_capacity,
        depth_levels = config.depth_levels,
        "Starting limit order book"
    );

    let depth_levels = opt.depth.unwrap_or(config.depth_levels);
    let (client, handle) = OrderBookWorker::new()
        .with_channel_capacity(config.channel_capacity)
        .start();

    if let Some(path) = &opt.replay {
        let mut driver = ReplayDriver::new(client.clone(), SequentialIdGenerator::new());
        driver
            .replay_file(path, |record| match serde_json::to_string(record) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!(error = %e, line = record.line, "failed to encode outcome"),
            })
            .await
            .with_context(|| format!("replay of {} failed", path.display()))?;
    }

    if opt.demo || opt.replay.is_none() {
        run_demo(&client).await?;
    }

    log_depth(&client.depth(depth_levels).await?);

    client.shutdown().await?;
    let book: OrderBook = tokio::task::spawn_blocking(move || handle.join())
        .await?
        .map_err(|_| anyhow!("order book worker panicked"))?;
    info!(resting_orders = book.order_count(), "Order book stopped");

    Ok(())
}

/// Rests three bids and walks them with two market sells, then cancels the
/// survivor and shows that a further market sell is refused.
async fn run_demo(client: &OrderBookClient) -> Result<()> {
    let mut factory = OrderFactory::new(ClockIdGenerator::new());

    for (price, size) in [(dec!(10000), dec!(5)), (dec!(9000), dec!(8)), (dec!(5000), dec!(10))] {
        let order = factory.bid(size);
        info!(order_id = %order.id(), %price, %size, "Resting bid");
        client.place_limit_order(price, order).await?;
    }

    let mut survivor = None;
    for size in [dec!(4), dec!(18)] {
        let outcome = client.place_market_order(factory.ask(size)).await?;
        for m in &outcome.matches {
            info!(
                maker = %m.maker_order_id,
                price = %m.price,
                size = %m.size_filled,
                maker_remaining = %m.maker_remaining,
                "Match"
            );
            if !m.maker_filled() {
                survivor = Some(m.maker_order_id);
            }
        }
        info!(filled = %outcome.filled_size(), fills = outcome.matches.len(), "Market sell done");
    }

    if let Some(order_id) = survivor {
        let cancelled = client.cancel_order(order_id).await?;
        info!(order_id = %cancelled.id(), remaining = %cancelled.remaining_size(), "Cancelled");
    }

    match client.place_market_order(factory.ask(Decimal::ONE)).await {
        Err(OrderbookError::InsufficientLiquidity { requested, available }) => {
            info!(%requested, %available, "Market sell refused on an empty side");
        }
        Err(e) => return Err(e.into()),
        Ok(outcome) => warn!(fills = outcome.matches.len(), "Unexpected fill on an empty side"),
    }

    Ok(())
}

fn log_depth(depth: &DepthSnapshot) {
    info!(
        best_bid = ?depth.best_bid(),
        best_ask = ?depth.best_ask(),
        spread = ?depth.spread(),
        bid_volume = %depth.total_bid_volume(),
        ask_volume = %depth.total_ask_volume(),
        "Current depth"
    );
    for level in &depth.asks {
        info!("  ask {} x {} ({} orders)", level.price, level.volume, level.order_count);
    }
    for level in &depth.bids {
        info!("  bid {} x {} ({} orders)", level.price, level.volume, level.order_count);
    }
}
