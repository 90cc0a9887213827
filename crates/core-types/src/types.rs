// In crates/core-types/src/types.rs

use crate::error::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A market instrument identifier as understood by its data source
/// (e.g. "BTCUSDT", "EURUSD=X", "BBCA.JK").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol(value.to_string())
    }
}

/// The market segment a scan runs against. Each one is served by its own data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    Crypto,
    Forex,
    Equities,
}

impl Market {
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Crypto => "crypto",
            Market::Forex => "forex",
            Market::Equities => "equities",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "crypto" => Ok(Market::Crypto),
            "forex" => Ok(Market::Forex),
            "equities" => Ok(Market::Equities),
            other => Err(Error::UnknownMarket(other.to_string())),
        }
    }
}

/// A single OHLCV observation (candlestick).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    /// Open time in milliseconds since the Unix epoch.
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Close time in milliseconds since the Unix epoch.
    pub close_time: i64,
}

/// The latest traded price and volume for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub last_price: Decimal,
    pub volume: Decimal,
}

/// The direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "LONG",
            Side::Short => "SHORT",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LONG" => Ok(Side::Long),
            "SHORT" => Ok(Side::Short),
            other => Err(Error::UnknownSide(other.to_string())),
        }
    }
}

/// The directional call produced by the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Long,
    Short,
    Neutral,
}

impl Action {
    /// Maps a signed aggregate score onto an action.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s > 0 => Action::Long,
            s if s < 0 => Action::Short,
            _ => Action::Neutral,
        }
    }

    /// The position side this action would open, if any.
    pub fn side(&self) -> Option<Side> {
        match self {
            Action::Long => Some(Side::Long),
            Action::Short => Some(Side::Short),
            Action::Neutral => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Long => "LONG",
            Action::Short => "SHORT",
            Action::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "NEUTRAL" => Ok(Action::Neutral),
            other => other.parse::<Side>().map(|side| match side {
                Side::Long => Action::Long,
                Side::Short => Action::Short,
            }),
        }
    }
}

/// Trend label derived from the sign of the trend score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl Trend {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s > 0 => Trend::Bullish,
            s if s < 0 => Trend::Bearish,
            _ => Trend::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Bullish => "BULLISH",
            Trend::Bearish => "BEARISH",
            Trend::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the fast/slow EMA pair. `Neutral` only when there is not enough history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EmaTrend {
    Bullish,
    Bearish,
    Neutral,
}

impl EmaTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmaTrend::Bullish => "BULLISH",
            EmaTrend::Bearish => "BEARISH",
            EmaTrend::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for EmaTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
