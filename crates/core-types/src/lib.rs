// In crates/core-types/src/lib.rs

pub mod analysis;
pub mod error;
pub mod position;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use analysis::{AnalysisResult, ChartPattern, PatternFlags, TradeLevels};
pub use error::{Error, Result};
pub use position::{price_to_decimal, profit_loss, ExitType, NewPosition, Position, PositionStatus, TradeRecord};
pub use types::{Action, EmaTrend, Kline, Market, Side, Symbol, Ticker, Trend};
