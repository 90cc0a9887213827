// In crates/engine/src/scheduler.rs

use crate::Scanner;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// The background loop: refreshes position prices and rescans the market
/// on their own intervals until `shutdown` resolves.
///
/// Both timers fire once immediately. A tick that falls behind a slow scan
/// is skipped rather than replayed.
pub async fn run(scanner: Arc<Scanner>, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
    let settings = scanner.settings();
    let mut price_timer = interval(Duration::from_secs(settings.update_interval_secs.max(1)));
    let mut scan_timer = interval(Duration::from_secs(settings.scan_interval_secs.max(1)));
    price_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    scan_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        market = %scanner.market(),
        update_secs = settings.update_interval_secs,
        scan_secs = settings.scan_interval_secs,
        "Scheduler started."
    );

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested. Stopping scheduler.");
                return Ok(());
            }
            _ = price_timer.tick() => {
                match scanner.update_all_prices().await {
                    Ok(updated) => tracing::debug!(updated, "Position prices refreshed."),
                    Err(e) => tracing::error!(error = %e, "Failed to refresh position prices."),
                }
            }
            _ = scan_timer.tick() => {
                let hits = scanner.scan_potential_assets(None).await;
                for hit in &hits {
                    tracing::info!(
                        symbol = %hit.symbol,
                        action = %hit.analysis.action,
                        score = hit.analysis.score,
                        "Signal."
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use core_types::{Market, Symbol};
    use database::SignalStore;

    #[tokio::test]
    async fn stops_when_shutdown_resolves() {
        let (scanner, store) = scanner(market_source(), 3);
        let scanner = Arc::new(scanner);

        // the first ticks are immediate, so one scan runs before the timeout
        let shutdown = tokio::time::sleep(Duration::from_millis(200));
        run(scanner, shutdown).await.unwrap();

        let saved = store.get_all_signals(Market::Crypto).await.unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved.iter().any(|s| s.symbol == Symbol::from("SPIKEUSDT")));
    }

    #[tokio::test]
    async fn an_already_resolved_shutdown_runs_nothing() {
        let (scanner, store) = scanner(market_source(), 3);
        run(Arc::new(scanner), std::future::ready(())).await.unwrap();
        assert!(store.get_all_signals(Market::Crypto).await.unwrap().is_empty());
    }
}
