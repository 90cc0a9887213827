// In crates/analytics/src/engine.rs

use crate::types::TradeSummary;
use core_types::TradeRecord;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Calculates performance metrics from the trade history.
#[derive(Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summarize(&self, trades: &[TradeRecord]) -> TradeSummary {
        let mut summary = TradeSummary::new();
        if trades.is_empty() {
            return summary;
        }

        summary.total_trades = trades.len() as u32;
        summary.net_pnl = trades.iter().map(|t| t.profit_loss).sum();

        // Break-even trades count towards the total only.
        let (winning, losing): (Vec<&TradeRecord>, Vec<&TradeRecord>) = trades
            .iter()
            .filter(|t| t.profit_loss != dec!(0))
            .partition(|t| t.profit_loss > dec!(0));
        summary.wins = winning.len() as u32;
        summary.losses = losing.len() as u32;
        summary.win_rate = (summary.wins as f64 / summary.total_trades as f64) * 100.0;

        summary.gross_profit = winning.iter().map(|t| t.profit_loss).sum();
        summary.gross_loss = losing.iter().map(|t| t.profit_loss).sum::<Decimal>().abs();
        summary.profit_factor = if summary.gross_loss > dec!(0) {
            (summary.gross_profit / summary.gross_loss).to_f64().unwrap_or(0.0)
        } else if summary.gross_profit > dec!(0) {
            f64::INFINITY
        } else {
            0.0
        };

        summary.expectancy = summary.net_pnl / Decimal::from(trades.len());
        summary
    }
}
