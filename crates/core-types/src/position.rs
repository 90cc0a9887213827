// In crates/core-types/src/position.rs

use crate::error::{Error, Result};
use crate::types::{Market, Side, Symbol};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Active,
    Closed,
}

impl PositionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionStatus::Active => "active",
            PositionStatus::Closed => "closed",
        }
    }
}

impl FromStr for PositionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(PositionStatus::Active),
            "closed" => Ok(PositionStatus::Closed),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitType {
    #[default]
    Manual,
    Tp1,
    Tp2,
    Tp3,
    Sl,
}

impl ExitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitType::Manual => "manual",
            ExitType::Tp1 => "tp1",
            ExitType::Tp2 => "tp2",
            ExitType::Tp3 => "tp3",
            ExitType::Sl => "sl",
        }
    }
}

impl fmt::Display for ExitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExitType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "manual" => Ok(ExitType::Manual),
            "tp1" => Ok(ExitType::Tp1),
            "tp2" => Ok(ExitType::Tp2),
            "tp3" => Ok(ExitType::Tp3),
            "sl" => Ok(ExitType::Sl),
            other => Err(Error::UnknownExitType(other.to_string())),
        }
    }
}

/// The fields needed to open a tracked position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPosition {
    pub symbol: Symbol,
    pub market: Market,
    pub side: Side,
    pub entry_price: Decimal,
    pub tp1: Decimal,
    pub tp2: Decimal,
    pub tp3: Decimal,
    pub sl: Decimal,
    /// Defaults to 2% below the entry when absent.
    pub entry_low: Option<Decimal>,
    /// Defaults to 2% above the entry when absent.
    pub entry_high: Option<Decimal>,
    /// Defaults to the entry price when absent.
    pub current_price: Option<Decimal>,
}

impl NewPosition {
    /// Fills in the optional fields the way the stores persist them.
    pub fn resolved_band(&self) -> (Decimal, Decimal, Decimal) {
        let low = self
            .entry_low
            .unwrap_or(self.entry_price * Decimal::new(98, 2));
        let high = self
            .entry_high
            .unwrap_or(self.entry_price * Decimal::new(102, 2));
        let current = self.current_price.unwrap_or(self.entry_price);
        (low, high, current)
    }
}

/// A tracked position as held by a position store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: i64,
    pub symbol: Symbol,
    pub market: Market,
    pub side: Side,
    pub entry_price: Decimal,
    pub entry_low: Decimal,
    pub entry_high: Decimal,
    pub tp1: Decimal,
    pub tp2: Decimal,
    pub tp3: Decimal,
    pub sl: Decimal,
    pub current_price: Decimal,
    pub status: PositionStatus,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Position {
    /// Profit or loss per unit if the position were closed at its current price.
    pub fn unrealized_pnl(&self) -> Decimal {
        profit_loss(self.side, self.entry_price, self.current_price)
    }
}

/// One closed trade, appended to the history when a position is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: i64,
    pub symbol: Symbol,
    pub market: Market,
    pub side: Side,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub profit_loss: Decimal,
    pub exit_type: ExitType,
    pub timestamp: DateTime<Utc>,
}

/// Per-unit profit or loss: `exit - entry` for longs, `entry - exit` for shorts.
pub fn profit_loss(side: Side, entry: Decimal, exit: Decimal) -> Decimal {
    match side {
        Side::Long => exit - entry,
        Side::Short => entry - exit,
    }
}

/// Converts an engine-side float price into a decimal for persistence.
pub fn price_to_decimal(value: f64) -> Result<Decimal> {
    Decimal::from_f64(value).ok_or(Error::InvalidPrice(value))
}
