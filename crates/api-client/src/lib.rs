// In crates/api-client/src/lib.rs

use app_config::Settings;
use async_trait::async_trait;
use core_types::{Kline, Market, Symbol, Ticker};
use std::time::Duration;

pub mod binance;
pub mod error;
pub mod types;
pub mod yahoo;

// Re-export public types
pub use binance::BinanceClient;
pub use error::{Error, Result};
pub use yahoo::YahooClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Assets scanned when the source cannot produce its own popularity ranking.
const CRYPTO_FALLBACK: [&str; 10] = [
    "BTCUSDT", "ETHUSDT", "BNBUSDT", "SOLUSDT", "ADAUSDT",
    "XRPUSDT", "DOTUSDT", "DOGEUSDT", "AVAXUSDT", "MATICUSDT",
];
const FOREX_FALLBACK: [&str; 5] = ["EURUSD=X", "GBPUSD=X", "USDJPY=X", "AUDUSD=X", "USDCAD=X"];
const EQUITIES_FALLBACK: [&str; 5] = ["BBCA.JK", "TLKM.JK", "ASII.JK", "BMRI.JK", "BBNI.JK"];

/// A read-only source of market data for one market segment.
///
/// Implementations report every failure as an `Error`; deciding whether a
/// failure skips an asset or aborts is left to the caller.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// The name of the source (e.g. "Binance", "Yahoo").
    fn name(&self) -> &'static str;

    /// Up to `limit` most recent bars of `timeframe`, oldest first.
    async fn get_ohlcv(&self, symbol: &Symbol, timeframe: &str, limit: usize) -> Result<Vec<Kline>>;

    /// Latest price and traded volume.
    async fn get_ticker(&self, symbol: &Symbol) -> Result<Ticker>;

    /// Up to `limit` symbols, most actively traded first.
    async fn get_popular_assets(&self, limit: usize) -> Result<Vec<Symbol>>;
}

/// Picks the data source serving `market`.
pub fn for_market(market: Market, settings: &Settings) -> Result<Box<dyn MarketDataSource>> {
    Ok(match market {
        Market::Crypto => Box::new(BinanceClient::new(&settings.binance)?),
        Market::Forex | Market::Equities => Box::new(YahooClient::new(&settings.yahoo, market)?),
    })
}

/// The static asset list for `market`, truncated to `limit`.
pub fn fallback_assets(market: Market, limit: usize) -> Vec<Symbol> {
    let list: &[&str] = match market {
        Market::Crypto => &CRYPTO_FALLBACK,
        Market::Forex => &FOREX_FALLBACK,
        Market::Equities => &EQUITIES_FALLBACK,
    };
    list.iter().take(limit).map(|s| Symbol::from(*s)).collect()
}

/// Turns user input such as `btc/usdt`, `eurusd` or `bbca` into the symbol
/// format the market's data source expects.
pub fn normalize_symbol(market: Market, input: &str) -> Symbol {
    let upper = input.trim().to_ascii_uppercase();
    let symbol = match market {
        Market::Crypto => {
            let joined = upper.replace('/', "");
            if joined.ends_with("USDT") { joined } else { format!("{joined}USDT") }
        }
        Market::Forex => {
            let joined = upper.replace('/', "");
            if joined.ends_with("=X") { joined } else { format!("{joined}=X") }
        }
        Market::Equities => {
            if upper.contains('.') { upper } else { format!("{upper}.JK") }
        }
    };
    Symbol(symbol)
}

pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("signal-scanner/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::ClientBuildError(e.to_string()))
}
