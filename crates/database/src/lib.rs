// In crates/database/src/lib.rs

use async_trait::async_trait;
use core_types::{AnalysisResult, ExitType, Market, NewPosition, Position, Symbol, TradeRecord};
use rust_decimal::Decimal;

pub mod error;
pub mod memory;
pub mod postgres;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use memory::InMemoryStore;
pub use postgres::{connect, Db};
pub use types::StoredSignal;

/// Persistence for scored signals.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Stores one analysis and returns its id.
    async fn save_signal(&self, symbol: &Symbol, market: Market, analysis: &AnalysisResult) -> Result<i64>;

    /// Every signal of `market`, newest first.
    async fn get_all_signals(&self, market: Market) -> Result<Vec<StoredSignal>>;

    /// Deletes all signals for the symbol. `true` if any existed.
    async fn delete_signal(&self, symbol: &Symbol, market: Market) -> Result<bool>;
}

/// Persistence for tracked positions and their closed-trade history.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Opens a position, filling absent band and price fields, and returns its id.
    async fn save_position(&self, position: NewPosition) -> Result<i64>;

    /// Sets the current price of every active position on `symbol`.
    /// `true` if at least one was updated.
    async fn update_current_price(&self, symbol: &Symbol, price: Decimal) -> Result<bool>;

    /// Active positions, optionally restricted to one market, newest first.
    async fn get_active_positions(&self, market: Option<Market>) -> Result<Vec<Position>>;

    /// Closes an active position at `exit_price` and appends the trade to the history.
    ///
    /// Returns `false` when the id is unknown or the position is already closed.
    async fn close_position(&self, id: i64, exit_price: Decimal, exit_type: ExitType) -> Result<bool>;

    /// The most recent closed trades, newest first.
    async fn get_trade_history(&self, market: Option<Market>, limit: usize) -> Result<Vec<TradeRecord>>;
}
