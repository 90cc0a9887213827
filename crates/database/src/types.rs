// In crates/database/src/types.rs

use crate::error::{Error, Result};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use core_types::{AnalysisResult, ExitType, Market, Position, PositionStatus, Side, Symbol, TradeRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::str::FromStr;

/// A saved analysis together with the asset it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSignal {
    pub id: i64,
    pub symbol: Symbol,
    pub market: Market,
    pub analysis: AnalysisResult,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SignalRow {
    pub id: i64,
    pub symbol: String,
    pub market: String,
    pub analysis: Json<AnalysisResult>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SignalRow> for StoredSignal {
    type Error = Error;

    fn try_from(row: SignalRow) -> Result<Self> {
        Ok(StoredSignal {
            id: row.id,
            symbol: Symbol(row.symbol),
            market: row.market.parse()?,
            analysis: row.analysis.0,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PositionRow {
    pub id: i64,
    pub symbol: String,
    pub market: String,
    pub side: String,
    pub entry_price: BigDecimal,
    pub entry_low: BigDecimal,
    pub entry_high: BigDecimal,
    pub tp1: BigDecimal,
    pub tp2: BigDecimal,
    pub tp3: BigDecimal,
    pub sl: BigDecimal,
    pub current_price: BigDecimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl TryFrom<PositionRow> for Position {
    type Error = Error;

    fn try_from(row: PositionRow) -> Result<Self> {
        Ok(Position {
            id: row.id,
            symbol: Symbol(row.symbol),
            market: row.market.parse()?,
            side: row.side.parse::<Side>()?,
            entry_price: from_numeric(&row.entry_price)?,
            entry_low: from_numeric(&row.entry_low)?,
            entry_high: from_numeric(&row.entry_high)?,
            tp1: from_numeric(&row.tp1)?,
            tp2: from_numeric(&row.tp2)?,
            tp3: from_numeric(&row.tp3)?,
            sl: from_numeric(&row.sl)?,
            current_price: from_numeric(&row.current_price)?,
            status: row.status.parse::<PositionStatus>()?,
            created_at: row.created_at,
            closed_at: row.closed_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TradeRow {
    pub id: i64,
    pub symbol: String,
    pub market: String,
    pub side: String,
    pub entry_price: BigDecimal,
    pub exit_price: BigDecimal,
    pub profit_loss: BigDecimal,
    pub exit_type: String,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<TradeRow> for TradeRecord {
    type Error = Error;

    fn try_from(row: TradeRow) -> Result<Self> {
        Ok(TradeRecord {
            id: row.id,
            symbol: Symbol(row.symbol),
            market: row.market.parse()?,
            side: row.side.parse()?,
            entry_price: from_numeric(&row.entry_price)?,
            exit_price: from_numeric(&row.exit_price)?,
            profit_loss: from_numeric(&row.profit_loss)?,
            exit_type: row.exit_type.parse::<ExitType>()?,
            timestamp: row.timestamp,
        })
    }
}

pub(crate) fn to_numeric(value: Decimal) -> Result<BigDecimal> {
    BigDecimal::from_str(&value.to_string()).map_err(|e| Error::NumericConversion(e.to_string()))
}

pub(crate) fn from_numeric(value: &BigDecimal) -> Result<Decimal> {
    Decimal::from_str(&value.to_string())
        .or_else(|_| Decimal::from_scientific(&value.to_string()))
        .map_err(|e| Error::NumericConversion(e.to_string()))
}
