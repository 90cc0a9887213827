// In crates/engine/src/scanner.rs

use anyhow::{Context, Result, anyhow};
use api_client::MarketDataSource;
use app_config::ScannerSettings;
use core_types::{
    price_to_decimal, Action, AnalysisResult, ExitType, Kline, Market, NewPosition, Position, Side, Symbol,
    TradeRecord,
};
use database::{PositionStore, SignalStore, StoredSignal};
use itertools::Itertools;
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::sync::Arc;
use std::time::Duration;
use strategies::levels::Targets;
use strategies::{Strategy, TechnicalAnalysis, MIN_BARS};

/// A scored asset, as persisted by the scan.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalHit {
    pub signal_id: i64,
    pub symbol: Symbol,
    pub market: Market,
    pub analysis: AnalysisResult,
}

/// TP/SL targets for a user-chosen entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomEntry {
    pub symbol: Symbol,
    pub side: Side,
    pub atr: f64,
    pub targets: Targets,
}

/// Runs the scoring engine over one market and keeps the stores in sync.
///
/// Every data-source call is independent, so a failure on one asset is
/// logged and skipped without affecting the rest of a scan.
pub struct Scanner {
    source: Box<dyn MarketDataSource>,
    signals: Arc<dyn SignalStore>,
    positions: Arc<dyn PositionStore>,
    strategy: TechnicalAnalysis,
    settings: ScannerSettings,
}

impl Scanner {
    pub fn new(
        source: Box<dyn MarketDataSource>,
        signals: Arc<dyn SignalStore>,
        positions: Arc<dyn PositionStore>,
        strategy: TechnicalAnalysis,
        settings: ScannerSettings,
    ) -> Self {
        Self { source, signals, positions, strategy, settings }
    }

    pub fn market(&self) -> Market {
        self.settings.market
    }

    pub fn settings(&self) -> &ScannerSettings {
        &self.settings
    }

    /// Popular assets from the source, or the static list for the market
    /// when the source fails or returns nothing.
    pub async fn popular_assets(&self, limit: Option<usize>) -> Vec<Symbol> {
        let limit = limit.unwrap_or(self.settings.analysis_coins_limit);
        match self.source.get_popular_assets(limit).await {
            Ok(assets) if !assets.is_empty() => assets,
            Ok(_) => {
                tracing::warn!(market = %self.market(), "No popular assets returned. Using fallback list.");
                api_client::fallback_assets(self.market(), limit)
            }
            Err(e) => {
                tracing::warn!(market = %self.market(), error = %e, "Failed to fetch popular assets. Using fallback list.");
                api_client::fallback_assets(self.market(), limit)
            }
        }
    }

    /// Scans the popular assets and returns the strongest directional signals.
    ///
    /// A signal passes when it is directional and `score >= min_score`; the
    /// comparison is signed, so SHORT calls only pass a threshold at or below
    /// their (negative) score. Passing signals are saved as they are found and
    /// the returned list is ordered by score, highest first, capped at `max_signals`.
    pub async fn scan_potential_assets(&self, limit: Option<usize>) -> Vec<SignalHit> {
        let assets = self.popular_assets(limit).await;
        let total = assets.len();
        let delay = Duration::from_millis(self.settings.request_delay_ms);
        tracing::info!(market = %self.market(), total, "Starting scan.");

        let mut hits = Vec::new();
        for (i, symbol) in assets.iter().enumerate() {
            tracing::debug!(%symbol, progress = i + 1, total, "Analyzing asset.");
            match self.scan_one(symbol).await {
                Ok(Some(hit)) => hits.push(hit),
                Ok(None) => {}
                Err(e) => tracing::warn!(%symbol, error = %e, "Skipping asset."),
            }
            if i + 1 < total && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let ranked: Vec<SignalHit> = hits
            .into_iter()
            .sorted_by_key(|hit| Reverse(hit.analysis.score))
            .take(self.settings.max_signals)
            .collect();
        tracing::info!(market = %self.market(), found = ranked.len(), "Scan complete.");
        ranked
    }

    async fn scan_one(&self, symbol: &Symbol) -> Result<Option<SignalHit>> {
        let klines = self.fetch_klines(symbol).await?;
        let Some(analysis) = self.strategy.analyze(&klines) else {
            tracing::debug!(%symbol, bars = klines.len(), "Insufficient data.");
            return Ok(None);
        };
        if analysis.action == Action::Neutral || analysis.score < self.settings.min_score {
            return Ok(None);
        }
        self.save(symbol, analysis).await.map(Some)
    }

    /// Analyses one asset and saves the result whatever its action.
    /// `None` when the series is too short to analyse.
    pub async fn analyze_asset(&self, symbol: &Symbol) -> Result<Option<SignalHit>> {
        let klines = self.fetch_klines(symbol).await?;
        match self.strategy.analyze(&klines) {
            Some(analysis) => self.save(symbol, analysis).await.map(Some),
            None => Ok(None),
        }
    }

    /// TP/SL for a custom entry price, spaced by the asset's current ATR.
    pub async fn calculate_custom_entry(&self, symbol: &Symbol, entry_price: f64, side: Side) -> Result<CustomEntry> {
        let klines = self.fetch_klines(symbol).await?;
        let targets = self
            .strategy
            .custom_entry(&klines, side, entry_price)
            .ok_or_else(|| anyhow!("insufficient data for ATR on {symbol}: {} of {MIN_BARS} bars", klines.len()))?;
        Ok(CustomEntry {
            symbol: symbol.clone(),
            side,
            atr: self.strategy.atr(&klines),
            targets,
        })
    }

    /// Opens a position from a directional signal. When `actual_entry` is
    /// given the levels are shifted onto it.
    pub async fn open_position(&self, hit: &SignalHit, actual_entry: Option<f64>) -> Result<i64> {
        let side = hit
            .analysis
            .action
            .side()
            .ok_or_else(|| anyhow!("{} has a NEUTRAL signal; nothing to open", hit.symbol))?;
        let levels = hit
            .analysis
            .levels
            .ok_or_else(|| anyhow!("signal for {} carries no trade levels", hit.symbol))?;
        let levels = match actual_entry {
            Some(entry) => levels.shifted_to(entry, self.strategy.settings().entry_range_pct),
            None => levels,
        };

        let position = NewPosition {
            symbol: hit.symbol.clone(),
            market: hit.market,
            side,
            entry_price: price_to_decimal(levels.ideal_entry)?,
            tp1: price_to_decimal(levels.tp1)?,
            tp2: price_to_decimal(levels.tp2)?,
            tp3: price_to_decimal(levels.tp3)?,
            sl: price_to_decimal(levels.sl)?,
            entry_low: Some(price_to_decimal(levels.entry_low)?),
            entry_high: Some(price_to_decimal(levels.entry_high)?),
            current_price: None,
        };
        let id = self.positions.save_position(position).await?;
        tracing::info!(id, symbol = %hit.symbol, %side, entry = levels.ideal_entry, "Opened position from signal.");
        Ok(id)
    }

    /// Opens a position at a custom entry with the targets from `calculate_custom_entry`.
    pub async fn open_custom_position(&self, entry: &CustomEntry) -> Result<i64> {
        let targets = &entry.targets;
        let position = NewPosition {
            symbol: entry.symbol.clone(),
            market: self.market(),
            side: entry.side,
            entry_price: price_to_decimal(targets.entry_price)?,
            tp1: price_to_decimal(targets.tp1)?,
            tp2: price_to_decimal(targets.tp2)?,
            tp3: price_to_decimal(targets.tp3)?,
            sl: price_to_decimal(targets.sl)?,
            entry_low: None,
            entry_high: None,
            current_price: None,
        };
        Ok(self.positions.save_position(position).await?)
    }

    /// Refreshes the current price of every active position in the market.
    /// A failed fetch or store write skips that symbol only.
    /// Returns the number of symbols updated.
    pub async fn update_all_prices(&self) -> Result<usize> {
        let active = self.positions.get_active_positions(Some(self.market())).await?;
        let mut updated = 0;
        for symbol in active.into_iter().map(|p| p.symbol).unique() {
            match self.source.get_ticker(&symbol).await {
                Ok(ticker) => match self.positions.update_current_price(&symbol, ticker.last_price).await {
                    Ok(true) => {
                        tracing::debug!(%symbol, price = %ticker.last_price, "Updated position price.");
                        updated += 1;
                    }
                    Ok(false) => {}
                    Err(e) => tracing::warn!(%symbol, error = %e, "Failed to store position price."),
                },
                Err(e) => tracing::warn!(%symbol, error = %e, "Failed to fetch ticker."),
            }
        }
        Ok(updated)
    }

    /// Active positions of the market with freshly updated prices.
    pub async fn active_positions(&self) -> Result<Vec<Position>> {
        self.update_all_prices().await?;
        Ok(self.positions.get_active_positions(Some(self.market())).await?)
    }

    pub async fn signals(&self) -> Result<Vec<StoredSignal>> {
        Ok(self.signals.get_all_signals(self.market()).await?)
    }

    /// Deletes the stored signals of every symbol not in `selected`.
    /// Returns the symbols that were removed.
    pub async fn delete_signals_not_selected(&self, selected: &[Symbol]) -> Result<Vec<Symbol>> {
        let stored = self.signals.get_all_signals(self.market()).await?;
        let mut removed = Vec::new();
        for symbol in stored.into_iter().map(|s| s.symbol).unique() {
            if selected.contains(&symbol) {
                continue;
            }
            if self.signals.delete_signal(&symbol, self.market()).await? {
                tracing::info!(%symbol, "Deleted non-selected signal.");
                removed.push(symbol);
            }
        }
        Ok(removed)
    }

    pub async fn close_position(&self, id: i64, exit_price: Decimal, exit_type: ExitType) -> Result<bool> {
        Ok(self.positions.close_position(id, exit_price, exit_type).await?)
    }

    pub async fn trade_history(&self, limit: usize) -> Result<Vec<TradeRecord>> {
        Ok(self.positions.get_trade_history(Some(self.market()), limit).await?)
    }

    async fn fetch_klines(&self, symbol: &Symbol) -> Result<Vec<Kline>> {
        let klines = self
            .source
            .get_ohlcv(symbol, &self.settings.timeframe, self.settings.ohlcv_limit)
            .await
            .with_context(|| format!("failed to fetch {} klines for {symbol}", self.settings.timeframe))?;
        Ok(klines)
    }

    async fn save(&self, symbol: &Symbol, analysis: AnalysisResult) -> Result<SignalHit> {
        let signal_id = self.signals.save_signal(symbol, self.market(), &analysis).await?;
        Ok(SignalHit { signal_id, symbol: symbol.clone(), market: self.market(), analysis })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use database::InMemoryStore;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn scan_keeps_strong_signals_ranked_by_score() {
        let mut source = market_source();
        // listed but without data: the fetch error is skipped
        source.popular.push(Symbol::from("GONEUSDT"));
        let (scanner, store) = scanner(source, 3);

        let hits = scanner.scan_potential_assets(None).await;
        let symbols: Vec<_> = hits.iter().map(|h| h.symbol.0.as_str()).collect();
        assert_eq!(symbols, vec!["SPIKEUSDT", "UPUSDT"]);
        assert_eq!(hits[0].analysis.score, 8);
        assert_eq!(hits[1].analysis.score, 7);

        // only the kept signals are saved
        assert_eq!(store.get_all_signals(Market::Crypto).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn short_signals_fail_a_positive_threshold() {
        let (scanner, _) = scanner(market_source(), 2);
        let hits = scanner.scan_potential_assets(None).await;
        let symbols: Vec<_> = hits.iter().map(|h| h.symbol.0.as_str()).collect();
        assert_eq!(symbols, vec!["SPIKEUSDT", "UPUSDT"]);
    }

    #[tokio::test]
    async fn a_negative_threshold_admits_short_signals_last() {
        let (scanner, _) = scanner(market_source(), -5);
        let hits = scanner.scan_potential_assets(None).await;
        let scores: Vec<_> = hits.iter().map(|h| h.analysis.score).collect();
        assert_eq!(scores, vec![8, 7, -2]);
        let last = hits.last().unwrap();
        assert_eq!(last.symbol, Symbol::from("DOWNUSDT"));
        assert_eq!(last.analysis.action, Action::Short);
    }

    #[tokio::test]
    async fn scan_is_capped_at_max_signals() {
        let store = Arc::new(InMemoryStore::new());
        let scanner = Scanner::new(
            Box::new(market_source()),
            store.clone(),
            store.clone(),
            TechnicalAnalysis::default(),
            ScannerSettings { max_signals: 1, ..settings(2) },
        );
        let hits = scanner.scan_potential_assets(None).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].symbol, Symbol::from("SPIKEUSDT"));
        // everything that passed the filter was still saved
        assert_eq!(store.get_all_signals(Market::Crypto).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_popularity_falls_back_to_the_static_list() {
        let mut source = StubSource::default();
        source.klines.insert(Symbol::from("ETHUSDT"), rising());
        let (scanner, _) = scanner(source, 3);

        assert_eq!(scanner.popular_assets(Some(4)).await.len(), 4);
        let hits = scanner.scan_potential_assets(None).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].symbol, Symbol::from("ETHUSDT"));
    }

    #[tokio::test]
    async fn analyze_asset_saves_weak_and_neutral_results_too() {
        let (scanner, store) = scanner(market_source(), 3);

        let hit = scanner.analyze_asset(&Symbol::from("DOWNUSDT")).await.unwrap().unwrap();
        assert_eq!(hit.analysis.score, -2);
        assert_eq!(store.get_all_signals(Market::Crypto).await.unwrap()[0].id, hit.signal_id);

        assert!(scanner.analyze_asset(&Symbol::from("THINUSDT")).await.unwrap().is_none());
        assert!(scanner.analyze_asset(&Symbol::from("GONEUSDT")).await.is_err());
    }

    #[tokio::test]
    async fn custom_entry_uses_the_current_atr() {
        let (scanner, _) = scanner(market_source(), 3);
        let entry = scanner
            .calculate_custom_entry(&Symbol::from("UPUSDT"), 150.0, Side::Short)
            .await
            .unwrap();
        assert_eq!(entry.atr, 2.0);
        assert_eq!((entry.targets.tp1, entry.targets.tp3, entry.targets.sl), (148.0, 144.0, 152.0));

        let err = scanner
            .calculate_custom_entry(&Symbol::from("THINUSDT"), 20.0, Side::Long)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("insufficient data"));
    }

    #[tokio::test]
    async fn opened_positions_follow_the_actual_entry_and_close_with_pnl() {
        let mut source = market_source();
        source.prices.insert(Symbol::from("UPUSDT"), dec!(165));
        let (scanner, _) = scanner(source, 3);

        let hit = scanner.analyze_asset(&Symbol::from("UPUSDT")).await.unwrap().unwrap();
        let id = scanner.open_position(&hit, Some(160.0)).await.unwrap();

        let positions = scanner.active_positions().await.unwrap();
        assert_eq!(positions.len(), 1);
        let position = &positions[0];
        assert_eq!(position.id, id);
        assert_eq!(position.side, Side::Long);
        assert_eq!(position.entry_price, dec!(160));
        assert_eq!((position.tp1, position.tp3, position.sl), (dec!(162), dec!(166), dec!(158)));
        // refreshed from the ticker before being returned
        assert_eq!(position.current_price, dec!(165));

        assert!(scanner.close_position(id, dec!(170), ExitType::Tp3).await.unwrap());
        let history = scanner.trade_history(10).await.unwrap();
        assert_eq!(history[0].profit_loss, dec!(10));
        assert!(scanner.active_positions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn a_neutral_signal_cannot_be_opened() {
        let (scanner, _) = scanner(market_source(), 3);
        let mut hit = scanner.analyze_asset(&Symbol::from("UPUSDT")).await.unwrap().unwrap();
        hit.analysis.action = Action::Neutral;
        assert!(scanner.open_position(&hit, None).await.is_err());
    }

    #[tokio::test]
    async fn price_update_failures_are_skipped() {
        let (scanner, _) = scanner(market_source(), 3);
        let entry = scanner
            .calculate_custom_entry(&Symbol::from("UPUSDT"), 150.0, Side::Long)
            .await
            .unwrap();
        scanner.open_custom_position(&entry).await.unwrap();

        // no ticker for UPUSDT in the stub
        assert_eq!(scanner.update_all_prices().await.unwrap(), 0);
        let positions = scanner.active_positions().await.unwrap();
        assert_eq!(positions[0].current_price, dec!(150));
        assert_eq!(positions[0].entry_low, dec!(147));
    }

    #[tokio::test]
    async fn a_failed_price_write_skips_only_that_symbol() {
        let mut source = market_source();
        source.prices.insert(Symbol::from("UPUSDT"), dec!(165));
        source.prices.insert(Symbol::from("DOWNUSDT"), dec!(420));
        let signals = Arc::new(InMemoryStore::new());
        let positions = Arc::new(FailingPriceStore { inner: InMemoryStore::new(), failing: Symbol::from("UPUSDT") });
        let scanner = Scanner::new(
            Box::new(source),
            signals,
            positions.clone(),
            TechnicalAnalysis::default(),
            settings(3),
        );
        for (symbol, price) in [("UPUSDT", 150.0), ("DOWNUSDT", 440.0)] {
            let entry = scanner
                .calculate_custom_entry(&Symbol::from(symbol), price, Side::Long)
                .await
                .unwrap();
            scanner.open_custom_position(&entry).await.unwrap();
        }

        assert_eq!(scanner.update_all_prices().await.unwrap(), 1);
        let stored = positions.inner.get_active_positions(None).await.unwrap();
        let price_of = |symbol: &str| {
            stored.iter().find(|p| p.symbol == Symbol::from(symbol)).unwrap().current_price
        };
        assert_eq!(price_of("UPUSDT"), dec!(150));
        assert_eq!(price_of("DOWNUSDT"), dec!(420));
    }

    #[tokio::test]
    async fn unselected_signals_are_pruned() {
        let (scanner, _) = scanner(market_source(), -5);
        scanner.scan_potential_assets(None).await;

        let removed = scanner
            .delete_signals_not_selected(&[Symbol::from("UPUSDT")])
            .await
            .unwrap();
        assert_eq!(removed.len(), 2);
        assert!(removed.contains(&Symbol::from("SPIKEUSDT")));
        assert!(removed.contains(&Symbol::from("DOWNUSDT")));

        let left = scanner.signals().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].symbol, Symbol::from("UPUSDT"));
    }
}
