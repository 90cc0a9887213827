// In crates/analytics/src/types.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate performance of a set of closed trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TradeSummary {
    pub total_trades: u32,
    pub wins: u32,
    pub losses: u32,
    /// Percentage of trades with a positive P&L (0-100).
    pub win_rate: f64,
    pub net_pnl: Decimal,
    pub gross_profit: Decimal,
    /// Sum of the losing trades, as a positive amount.
    pub gross_loss: Decimal,
    /// Gross profit over gross loss; infinite when there are wins and no losses.
    pub profit_factor: f64,
    /// Average P&L per trade.
    pub expectancy: Decimal,
}

impl TradeSummary {
    pub fn new() -> Self {
        Self::default()
    }
}
