// In crates/app-config/src/types.rs

use core_types::Market;
use serde::Deserialize;
use strategies::types::TechnicalSettings;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    #[serde(default)]
    pub scanner: ScannerSettings,
    /// Scoring engine knobs, handed to `TechnicalAnalysis` once at startup.
    #[serde(default)]
    pub strategy: TechnicalSettings,
    #[serde(default)]
    pub binance: BinanceSettings,
    #[serde(default)]
    pub yahoo: YahooSettings,
    /// Settings for the database connection.
    pub database: DatabaseSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

/// What to scan and how often.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ScannerSettings {
    pub market: Market,
    pub timeframe: String,
    /// Signals scoring below this are discarded by the scan. The comparison is
    /// signed, so SHORT calls only pass a threshold at or below their score.
    pub min_score: i32,
    pub max_signals: usize,
    pub analysis_coins_limit: usize,
    pub ohlcv_limit: usize,
    /// Pause between consecutive assets in a scan, for upstream rate limits.
    pub request_delay_ms: u64,
    pub update_interval_secs: u64,
    pub scan_interval_secs: u64,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            market: Market::Crypto,
            timeframe: "1h".to_string(),
            min_score: 3,
            max_signals: 5,
            analysis_coins_limit: 50,
            ohlcv_limit: 200,
            request_delay_ms: 200,
            update_interval_secs: 30,
            scan_interval_secs: 300,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BinanceSettings {
    /// The public REST API base URL for Binance spot.
    pub rest_base_url: String,
}

impl Default for BinanceSettings {
    fn default() -> Self {
        Self { rest_base_url: "https://api.binance.com".to_string() }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct YahooSettings {
    pub base_url: String,
}

impl Default for YahooSettings {
    fn default() -> Self {
        Self { base_url: "https://query1.finance.yahoo.com".to_string() }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseSettings {
    /// The connection URL for the PostgreSQL database.
    pub url: String,
}
