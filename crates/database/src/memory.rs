// In crates/database/src/memory.rs

use crate::{PositionStore, Result, SignalStore, StoredSignal};
use async_trait::async_trait;
use chrono::Utc;
use core_types::{
    profit_loss, AnalysisResult, ExitType, Market, NewPosition, Position, PositionStatus, Symbol, TradeRecord,
};
use rust_decimal::Decimal;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct State {
    signals: Vec<StoredSignal>,
    positions: Vec<Position>,
    trades: Vec<TradeRecord>,
    last_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// A process-local store with the same semantics as `Db`.
///
/// Rows live in insertion order, so "newest first" is simply reverse order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // every write completes under one guard, so a poisoned state is still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SignalStore for InMemoryStore {
    async fn save_signal(&self, symbol: &Symbol, market: Market, analysis: &AnalysisResult) -> Result<i64> {
        let mut state = self.state();
        let id = state.next_id();
        state.signals.push(StoredSignal {
            id,
            symbol: symbol.clone(),
            market,
            analysis: analysis.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn get_all_signals(&self, market: Market) -> Result<Vec<StoredSignal>> {
        Ok(self
            .state()
            .signals
            .iter()
            .rev()
            .filter(|s| s.market == market)
            .cloned()
            .collect())
    }

    async fn delete_signal(&self, symbol: &Symbol, market: Market) -> Result<bool> {
        let mut state = self.state();
        let before = state.signals.len();
        state.signals.retain(|s| !(s.symbol == *symbol && s.market == market));
        Ok(state.signals.len() < before)
    }
}

#[async_trait]
impl PositionStore for InMemoryStore {
    async fn save_position(&self, position: NewPosition) -> Result<i64> {
        let (entry_low, entry_high, current_price) = position.resolved_band();
        let mut state = self.state();
        let id = state.next_id();
        state.positions.push(Position {
            id,
            symbol: position.symbol,
            market: position.market,
            side: position.side,
            entry_price: position.entry_price,
            entry_low,
            entry_high,
            tp1: position.tp1,
            tp2: position.tp2,
            tp3: position.tp3,
            sl: position.sl,
            current_price,
            status: PositionStatus::Active,
            created_at: Utc::now(),
            closed_at: None,
        });
        Ok(id)
    }

    async fn update_current_price(&self, symbol: &Symbol, price: Decimal) -> Result<bool> {
        let mut state = self.state();
        let mut updated = false;
        for position in state
            .positions
            .iter_mut()
            .filter(|p| p.status == PositionStatus::Active && p.symbol == *symbol)
        {
            position.current_price = price;
            updated = true;
        }
        Ok(updated)
    }

    async fn get_active_positions(&self, market: Option<Market>) -> Result<Vec<Position>> {
        Ok(self
            .state()
            .positions
            .iter()
            .rev()
            .filter(|p| p.status == PositionStatus::Active)
            .filter(|p| market.is_none_or(|m| p.market == m))
            .cloned()
            .collect())
    }

    async fn close_position(&self, id: i64, exit_price: Decimal, exit_type: ExitType) -> Result<bool> {
        let mut state = self.state();
        let Some(index) = state
            .positions
            .iter()
            .position(|p| p.id == id && p.status == PositionStatus::Active)
        else {
            return Ok(false);
        };

        let now = Utc::now();
        let trade_id = state.next_id();
        let position = &mut state.positions[index];
        position.status = PositionStatus::Closed;
        position.closed_at = Some(now);
        position.current_price = exit_price;

        let trade = TradeRecord {
            id: trade_id,
            symbol: position.symbol.clone(),
            market: position.market,
            side: position.side,
            entry_price: position.entry_price,
            exit_price,
            profit_loss: profit_loss(position.side, position.entry_price, exit_price),
            exit_type,
            timestamp: now,
        };
        state.trades.push(trade);
        Ok(true)
    }

    async fn get_trade_history(&self, market: Option<Market>, limit: usize) -> Result<Vec<TradeRecord>> {
        Ok(self
            .state()
            .trades
            .iter()
            .rev()
            .filter(|t| market.is_none_or(|m| t.market == m))
            .take(limit)
            .cloned()
            .collect())
    }
}
