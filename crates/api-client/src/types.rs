// In crates/api-client/src/types.rs

use serde::Deserialize;

/// One row of `/api/v3/klines`: a positional array mixing numbers and decimal strings.
#[derive(Debug, Deserialize)]
pub struct RawKline(
    pub i64,         // 0: Open time
    pub String,      // 1: Open
    pub String,      // 2: High
    pub String,      // 3: Low
    pub String,      // 4: Close
    pub String,      // 5: Volume
    pub i64,         // 6: Close time
    pub String,      // 7: Quote asset volume
    pub i64,         // 8: Number of trades
    pub String,      // 9: Taker buy base asset volume
    pub String,      // 10: Taker buy quote asset volume
    pub String,      // 11: Ignore
);

/// One entry of `GET /api/v3/ticker/24hr`.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24h {
    pub symbol: String,
    pub last_price: String,
    pub volume: String,
    pub quote_volume: String,
}

/// The error object Binance returns instead of a payload.
#[derive(Debug, Deserialize)]
pub struct BinanceError {
    pub code: i64,
    pub msg: String,
}

/// Yahoo Finance chart response structures
pub mod yahoo {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct ChartResponse {
        pub chart: Chart,
    }

    #[derive(Debug, Deserialize)]
    pub struct Chart {
        pub result: Option<Vec<ChartResult>>,
        pub error: Option<ChartError>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ChartError {
        pub code: String,
        pub description: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ChartResult {
        pub meta: ChartMeta,
        pub timestamp: Option<Vec<i64>>,
        pub indicators: Indicators,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ChartMeta {
        pub symbol: String,
        pub regular_market_price: Option<f64>,
        pub regular_market_volume: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Indicators {
        pub quote: Vec<Quote>,
    }

    /// Columns are aligned with `ChartResult::timestamp`; a `None` marks a bar
    /// where the market was closed.
    #[derive(Debug, Deserialize, Default)]
    #[serde(default)]
    pub struct Quote {
        pub open: Vec<Option<f64>>,
        pub high: Vec<Option<f64>>,
        pub low: Vec<Option<f64>>,
        pub close: Vec<Option<f64>>,
        pub volume: Vec<Option<f64>>,
    }
}
