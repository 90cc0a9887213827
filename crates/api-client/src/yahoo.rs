// In crates/api-client/src/yahoo.rs

use crate::types::yahoo::{ChartResponse, ChartResult};
use crate::{Error, MarketDataSource, Result};
use app_config::YahooSettings;
use async_trait::async_trait;
use core_types::{Kline, Market, Symbol, Ticker};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

const FOREX_PAIRS: [&str; 15] = [
    "EURUSD=X", "GBPUSD=X", "USDJPY=X", "AUDUSD=X", "USDCAD=X",
    "USDCHF=X", "NZDUSD=X", "EURGBP=X", "EURJPY=X", "GBPJPY=X",
    "AUDJPY=X", "USDSGD=X", "EURCAD=X", "AUDCAD=X", "NZDJPY=X",
];
/// Large caps on the Indonesia Stock Exchange.
const IDX_EQUITIES: [&str; 10] = [
    "BBCA.JK", "TLKM.JK", "ASII.JK", "BMRI.JK", "BBNI.JK",
    "BBRI.JK", "ANTM.JK", "UNVR.JK", "INDF.JK", "GOTO.JK",
];

/// Yahoo Finance chart client, serving the forex and equities markets.
#[derive(Debug, Clone)]
pub struct YahooClient {
    http_client: reqwest::Client,
    base_url: String,
    market: Market,
}

impl YahooClient {
    pub fn new(settings: &YahooSettings, market: Market) -> Result<Self> {
        Ok(Self {
            http_client: crate::http_client()?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            market,
        })
    }

    /// `GET /v8/finance/chart/{symbol}?interval=&range=`
    async fn chart(&self, symbol: &Symbol, interval: &str, range: &str) -> Result<ChartResult> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol.0);
        let body = self
            .http_client
            .get(&url)
            .query(&[("interval", interval), ("range", range)])
            .send()
            .await?
            .text()
            .await?;
        parse_chart(&body, symbol)
    }
}

#[async_trait]
impl MarketDataSource for YahooClient {
    fn name(&self) -> &'static str {
        "Yahoo"
    }

    async fn get_ohlcv(&self, symbol: &Symbol, timeframe: &str, limit: usize) -> Result<Vec<Kline>> {
        let (interval, range) = interval_and_range(timeframe, limit);
        let chart = self.chart(symbol, interval, range).await?;
        let klines = chart_klines(&chart, interval, limit);
        if klines.is_empty() {
            return Err(Error::NoData(symbol.0.clone()));
        }
        Ok(klines)
    }

    async fn get_ticker(&self, symbol: &Symbol) -> Result<Ticker> {
        let chart = self.chart(symbol, "1m", "1d").await?;
        chart_ticker(&chart).ok_or_else(|| Error::NoData(symbol.0.clone()))
    }

    async fn get_popular_assets(&self, limit: usize) -> Result<Vec<Symbol>> {
        let list: &[&str] = match self.market {
            Market::Equities => &IDX_EQUITIES,
            Market::Forex | Market::Crypto => &FOREX_PAIRS,
        };
        Ok(list.iter().take(limit).map(|s| Symbol::from(*s)).collect())
    }
}

/// Maps a scanner timeframe onto a Yahoo `(interval, range)` pair.
///
/// Hourly history is only served for a short window, so the range grows
/// with the number of bars requested.
pub fn interval_and_range(timeframe: &str, limit: usize) -> (&'static str, &'static str) {
    match timeframe {
        "4h" => ("4h", "1y"),
        "1d" => ("1d", "1y"),
        "1w" => ("1wk", "1y"),
        _ if limit <= 120 => ("1h", "5d"),
        _ => ("1h", "2mo"),
    }
}

fn interval_millis(interval: &str) -> i64 {
    const HOUR: i64 = 3_600_000;
    match interval {
        "1m" => 60_000,
        "4h" => 4 * HOUR,
        "1d" => 24 * HOUR,
        "1wk" => 7 * 24 * HOUR,
        _ => HOUR,
    }
}

fn parse_chart(body: &str, symbol: &Symbol) -> Result<ChartResult> {
    let response: ChartResponse = serde_json::from_str(body)?;
    if let Some(err) = response.chart.error {
        return Err(Error::ApiError { code: err.code, msg: err.description });
    }
    response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| Error::NoData(symbol.0.clone()))
}

/// Complete bars of the chart, oldest first, truncated to the last `limit`.
/// Rows with any missing price are skipped; a missing volume counts as zero.
fn chart_klines(chart: &ChartResult, interval: &str, limit: usize) -> Vec<Kline> {
    let (Some(timestamps), Some(quote)) = (chart.timestamp.as_ref(), chart.indicators.quote.first()) else {
        return Vec::new();
    };
    let step = interval_millis(interval);

    let klines: Vec<Kline> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let open_time = ts * 1000;
            Some(Kline {
                open_time,
                open: at(&quote.open, i)?,
                high: at(&quote.high, i)?,
                low: at(&quote.low, i)?,
                close: at(&quote.close, i)?,
                volume: at(&quote.volume, i).unwrap_or_default(),
                close_time: open_time + step - 1,
            })
        })
        .collect();

    let skip = klines.len().saturating_sub(limit);
    klines.into_iter().skip(skip).collect()
}

fn at(column: &[Option<f64>], i: usize) -> Option<Decimal> {
    column.get(i).copied().flatten().and_then(Decimal::from_f64)
}

fn chart_ticker(chart: &ChartResult) -> Option<Ticker> {
    let last_close = chart
        .indicators
        .quote
        .first()
        .and_then(|q| q.close.iter().rev().find_map(|c| *c));
    let last_price = last_close.or(chart.meta.regular_market_price)?;
    Some(Ticker {
        last_price: Decimal::from_f64(last_price)?,
        volume: chart
            .meta
            .regular_market_volume
            .and_then(Decimal::from_f64)
            .unwrap_or_default(),
    })
}
