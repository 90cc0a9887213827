// In crates/engine/src/testing.rs
// Fixtures shared by the engine tests.

use crate::Scanner;
use api_client::MarketDataSource;
use app_config::ScannerSettings;
use async_trait::async_trait;
use core_types::{price_to_decimal, ExitType, Kline, Market, NewPosition, Position, Symbol, Ticker, TradeRecord};
use database::{InMemoryStore, PositionStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use strategies::{TechnicalAnalysis, TechnicalSettings};

pub fn klines(closes: impl IntoIterator<Item = f64>) -> Vec<Kline> {
    closes
        .into_iter()
        .enumerate()
        .map(|(i, c)| Kline {
            open_time: i as i64 * 3_600_000,
            open: price_to_decimal(c).unwrap(),
            high: price_to_decimal(c + 1.0).unwrap(),
            low: price_to_decimal(c - 1.0).unwrap(),
            close: price_to_decimal(c).unwrap(),
            volume: dec!(1000),
            close_time: (i as i64 + 1) * 3_600_000 - 1,
        })
        .collect()
}

// closes 100..=159: LONG at score 7
pub fn rising() -> Vec<Kline> {
    klines((0..60).map(|i| 100.0 + i as f64))
}

// same trend with a volume spike on the last bar: LONG at score 8
pub fn rising_on_volume() -> Vec<Kline> {
    let mut bars = rising();
    bars.last_mut().unwrap().volume = dec!(5000);
    bars
}

// closes 500 down to 431: SHORT at score -2
pub fn falling() -> Vec<Kline> {
    klines((0..70).map(|i| 500.0 - i as f64))
}

#[derive(Default)]
pub struct StubSource {
    pub popular: Vec<Symbol>,
    pub klines: HashMap<Symbol, Vec<Kline>>,
    pub prices: HashMap<Symbol, Decimal>,
}

impl StubSource {
    pub fn with(mut self, symbol: &str, bars: Vec<Kline>) -> Self {
        self.popular.push(Symbol::from(symbol));
        self.klines.insert(Symbol::from(symbol), bars);
        self
    }
}

#[async_trait]
impl MarketDataSource for StubSource {
    fn name(&self) -> &'static str {
        "Stub"
    }

    async fn get_ohlcv(&self, symbol: &Symbol, _timeframe: &str, limit: usize) -> api_client::Result<Vec<Kline>> {
        let bars = self
            .klines
            .get(symbol)
            .ok_or_else(|| api_client::Error::NoData(symbol.0.clone()))?;
        Ok(bars[bars.len().saturating_sub(limit)..].to_vec())
    }

    async fn get_ticker(&self, symbol: &Symbol) -> api_client::Result<Ticker> {
        let last_price = *self
            .prices
            .get(symbol)
            .ok_or_else(|| api_client::Error::NoData(symbol.0.clone()))?;
        Ok(Ticker { last_price, volume: Decimal::ZERO })
    }

    async fn get_popular_assets(&self, limit: usize) -> api_client::Result<Vec<Symbol>> {
        Ok(self.popular.iter().take(limit).cloned().collect())
    }
}

pub fn settings(min_score: i32) -> ScannerSettings {
    ScannerSettings { min_score, request_delay_ms: 0, ..ScannerSettings::default() }
}

pub fn scanner(source: StubSource, min_score: i32) -> (Scanner, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let scanner = Scanner::new(
        Box::new(source),
        store.clone(),
        store.clone(),
        TechnicalAnalysis::new(TechnicalSettings::default()),
        settings(min_score),
    );
    (scanner, store)
}

pub fn market_source() -> StubSource {
    StubSource::default()
        .with("UPUSDT", rising())
        .with("DOWNUSDT", falling())
        .with("THINUSDT", klines((0..30).map(|i| 10.0 + i as f64)))
        .with("SPIKEUSDT", rising_on_volume())
}

/// Position store whose price writes fail for one symbol.
pub struct FailingPriceStore {
    pub inner: InMemoryStore,
    pub failing: Symbol,
}

#[async_trait]
impl PositionStore for FailingPriceStore {
    async fn save_position(&self, position: NewPosition) -> database::Result<i64> {
        self.inner.save_position(position).await
    }

    async fn update_current_price(&self, symbol: &Symbol, price: Decimal) -> database::Result<bool> {
        if *symbol == self.failing {
            return Err(database::Error::NumericConversion(format!("rejected price for {symbol}")));
        }
        self.inner.update_current_price(symbol, price).await
    }

    async fn get_active_positions(&self, market: Option<Market>) -> database::Result<Vec<Position>> {
        self.inner.get_active_positions(market).await
    }

    async fn close_position(&self, id: i64, exit_price: Decimal, exit_type: ExitType) -> database::Result<bool> {
        self.inner.close_position(id, exit_price, exit_type).await
    }

    async fn get_trade_history(&self, market: Option<Market>, limit: usize) -> database::Result<Vec<TradeRecord>> {
        self.inner.get_trade_history(market, limit).await
    }
}
