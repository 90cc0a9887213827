// In app/src/main.rs

use anyhow::{bail, Result};
use app_config::Settings;
use clap::{Parser, Subcommand};
use core_types::{ExitType, Market, Side, Symbol};
use database::{InMemoryStore, PositionStore, SignalStore};
use engine::Scanner;
use rust_decimal::Decimal;
use std::sync::Arc;
use strategies::TechnicalAnalysis;
use tracing_subscriber::prelude::*;

mod report;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "A technical-analysis signal scanner for crypto, forex and IDX equities.")]
struct Cli {
    /// Keep signals and positions in process memory instead of PostgreSQL.
    /// Nothing survives the process, so this is mostly useful with `scan`, `analyze` and `run`.
    #[arg(long, global = true)]
    memory: bool,

    /// Overrides `scanner.market` from the configuration.
    #[arg(short, long, global = true)]
    market: Option<Market>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scans the most popular assets and prints the strongest signals.
    Scan {
        /// How many assets to analyse (defaults to `scanner.analysis_coins_limit`).
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Analyses a single asset and saves the result.
    Analyze {
        /// e.g. "BTCUSDT", "btc/usdt", "eurusd", "bbca".
        symbol: String,
    },

    /// Computes TP/SL levels for a custom entry price from the current ATR.
    CustomEntry {
        symbol: String,
        price: f64,
        #[arg(long, default_value = "LONG")]
        side: Side,
        /// Also opens a position at this entry.
        #[arg(long)]
        open: bool,
    },

    /// Analyses an asset and opens a position from its signal.
    Open {
        symbol: String,
        /// The actual fill price; levels are shifted onto it.
        #[arg(long)]
        entry: Option<f64>,
    },

    /// Lists active positions with refreshed prices.
    Positions,

    /// Refreshes the current price of every active position.
    UpdatePrices,

    /// Closes a position and records the trade.
    Close {
        id: i64,
        exit_price: Decimal,
        #[arg(long, default_value = "manual")]
        exit_type: ExitType,
    },

    /// Prints the closed-trade history with a performance summary.
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Lists the stored signals of the market.
    Signals,

    /// Deletes stored signals for every symbol not listed.
    Prune { keep: Vec<String> },

    /// Refreshes prices and rescans on the configured intervals until Ctrl-C.
    Run,
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut settings = app_config::load_settings()?;
    if let Some(market) = cli.market {
        settings.scanner.market = market;
    }

    let default_level = settings.app.log_level.parse().unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("sqlx", tracing::Level::WARN)
            .with_default(default_level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::info!(
        environment = %settings.app.environment,
        market = %settings.scanner.market,
        timeframe = %settings.scanner.timeframe,
        "Settings loaded."
    );

    let scanner = build_scanner(&settings, cli.memory).await?;
    let market = scanner.market();

    match cli.command {
        Commands::Scan { limit } => {
            let hits = scanner.scan_potential_assets(limit).await;
            report::print_hits(market, &hits);
        }
        Commands::Analyze { symbol } => {
            let symbol = api_client::normalize_symbol(market, &symbol);
            match scanner.analyze_asset(&symbol).await? {
                Some(hit) => report::print_analysis(&hit),
                None => println!("Not enough data to analyse {symbol}."),
            }
        }
        Commands::CustomEntry { symbol, price, side, open } => {
            let symbol = api_client::normalize_symbol(market, &symbol);
            let entry = scanner.calculate_custom_entry(&symbol, price, side).await?;
            report::print_custom_entry(&entry);
            if open {
                let id = scanner.open_custom_position(&entry).await?;
                println!("Opened position #{id}.");
            }
        }
        Commands::Open { symbol, entry } => {
            let symbol = api_client::normalize_symbol(market, &symbol);
            let Some(hit) = scanner.analyze_asset(&symbol).await? else {
                bail!("not enough data to analyse {symbol}");
            };
            report::print_analysis(&hit);
            let id = scanner.open_position(&hit, entry).await?;
            println!("Opened position #{id}.");
        }
        Commands::Positions => {
            let positions = scanner.active_positions().await?;
            report::print_positions(&positions);
        }
        Commands::UpdatePrices => {
            let updated = scanner.update_all_prices().await?;
            println!("Updated prices for {updated} symbol(s).");
        }
        Commands::Close { id, exit_price, exit_type } => {
            if scanner.close_position(id, exit_price, exit_type).await? {
                println!("Closed position #{id} at {exit_price} ({exit_type}).");
            } else {
                bail!("position #{id} does not exist or is already closed");
            }
        }
        Commands::History { limit } => {
            let trades = scanner.trade_history(limit).await?;
            let summary = analytics::AnalyticsEngine::new().summarize(&trades);
            report::print_history(&trades, &summary);
        }
        Commands::Signals => {
            let signals = scanner.signals().await?;
            report::print_signals(&signals);
        }
        Commands::Prune { keep } => {
            let keep: Vec<Symbol> = keep.iter().map(|s| api_client::normalize_symbol(market, s)).collect();
            let removed = scanner.delete_signals_not_selected(&keep).await?;
            println!("Removed signals for {} symbol(s).", removed.len());
        }
        Commands::Run => {
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
                }
            };
            engine::scheduler::run(Arc::new(scanner), shutdown).await?;
        }
    }

    Ok(())
}

/// Wires the data source for the configured market to the chosen store.
async fn build_scanner(settings: &Settings, memory: bool) -> Result<Scanner> {
    let source = api_client::for_market(settings.scanner.market, settings)?;
    tracing::info!(source = source.name(), "Market data source ready.");

    let signals: Arc<dyn SignalStore>;
    let positions: Arc<dyn PositionStore>;
    if memory {
        tracing::warn!("Using the in-memory store. Nothing will be persisted.");
        let store = Arc::new(InMemoryStore::new());
        signals = store.clone();
        positions = store;
    } else {
        let db = Arc::new(database::connect(&settings.database).await?);
        signals = db.clone();
        positions = db;
    }

    Ok(Scanner::new(
        source,
        signals,
        positions,
        TechnicalAnalysis::new(settings.strategy),
        settings.scanner.clone(),
    ))
}
