// In crates/api-client/src/binance.rs

use crate::types::{BinanceError, RawKline, Ticker24h};
use crate::{Error, MarketDataSource, Result};
use app_config::BinanceSettings;
use async_trait::async_trait;
use core_types::{Kline, Symbol, Ticker};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

/// Binance caps a single klines request at this many bars.
const MAX_KLINES_PER_REQUEST: usize = 1000;
const QUOTE_ASSET: &str = "USDT";
/// Stablecoin bases; a stable/stable pair carries no directional signal.
const EXCLUDED_BASES: [&str; 6] = ["BUSD", "USDC", "DAI", "TUSD", "USDP", "UST"];

/// Public (unsigned) Binance spot REST client, serving the crypto market.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(settings: &BinanceSettings) -> Result<Self> {
        Ok(Self {
            http_client: crate::http_client()?,
            base_url: settings.rest_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let body = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await?
            .text()
            .await?;
        parse_response(&body)
    }
}

#[async_trait]
impl MarketDataSource for BinanceClient {
    fn name(&self) -> &'static str {
        "Binance"
    }

    /// `GET /api/v3/klines`
    async fn get_ohlcv(&self, symbol: &Symbol, timeframe: &str, limit: usize) -> Result<Vec<Kline>> {
        let limit = limit.clamp(1, MAX_KLINES_PER_REQUEST);
        let raw: Vec<RawKline> = self
            .get(
                "/api/v3/klines",
                &[
                    ("symbol", symbol.0.clone()),
                    ("interval", timeframe.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        if raw.is_empty() {
            return Err(Error::NoData(symbol.0.clone()));
        }
        Ok(raw.into_iter().map(into_kline).collect())
    }

    /// `GET /api/v3/ticker/24hr?symbol=`
    async fn get_ticker(&self, symbol: &Symbol) -> Result<Ticker> {
        let ticker: Ticker24h = self
            .get("/api/v3/ticker/24hr", &[("symbol", symbol.0.clone())])
            .await?;
        Ok(Ticker {
            last_price: ticker.last_price.parse().unwrap_or_default(),
            volume: ticker.volume.parse().unwrap_or_default(),
        })
    }

    /// `GET /api/v3/ticker/24hr` for every pair, ranked by quote volume.
    async fn get_popular_assets(&self, limit: usize) -> Result<Vec<Symbol>> {
        let tickers: Vec<Ticker24h> = self.get("/api/v3/ticker/24hr", &[]).await?;
        let assets = rank_usdt_pairs(tickers, limit);
        tracing::debug!(count = assets.len(), "Ranked USDT pairs by quote volume.");
        Ok(assets)
    }
}

/// Deserializes `body`, surfacing a Binance error object as `Error::ApiError`.
fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        // If deserialization fails, it might be a Binance error object.
        match serde_json::from_str::<BinanceError>(body) {
            Ok(err) => Error::ApiError { code: err.code.to_string(), msg: err.msg },
            Err(_) => Error::DeserializationFailed(e),
        }
    })
}

fn into_kline(raw: RawKline) -> Kline {
    Kline {
        open_time: raw.0,
        open: raw.1.parse().unwrap_or_default(),
        high: raw.2.parse().unwrap_or_default(),
        low: raw.3.parse().unwrap_or_default(),
        close: raw.4.parse().unwrap_or_default(),
        volume: raw.5.parse().unwrap_or_default(),
        close_time: raw.6,
    }
}

fn rank_usdt_pairs(tickers: Vec<Ticker24h>, limit: usize) -> Vec<Symbol> {
    let mut pairs: Vec<(String, Decimal)> = tickers
        .into_iter()
        .filter_map(|t| {
            let base = t.symbol.strip_suffix(QUOTE_ASSET)?;
            if base.is_empty() || EXCLUDED_BASES.iter().any(|ex| base.contains(ex)) {
                return None;
            }
            let quote_volume = t.quote_volume.parse().unwrap_or_default();
            Some((t.symbol, quote_volume))
        })
        .collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1));
    pairs.into_iter().take(limit).map(|(symbol, _)| Symbol(symbol)).collect()
}
