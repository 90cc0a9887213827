// In crates/strategies/src/lib.rs

use core_types::{AnalysisResult, Kline};

pub mod indicators;
pub mod levels;
pub mod patterns;
pub mod scorer;
pub mod series;
pub mod structure;
pub mod technical;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use technical::TechnicalAnalysis;
pub use types::TechnicalSettings;

/// Minimum number of bars any analysis is attempted on.
pub const MIN_BARS: usize = 50;

/// The universal interface for a signal-scoring strategy.
///
/// A strategy turns a chronological kline series into an `AnalysisResult`.
/// It holds only immutable configuration, so a single instance can score
/// many assets concurrently.
pub trait Strategy: Send + Sync {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    /// Scores the series. Returns `None` when there is not enough history.
    fn analyze(&self, klines: &[Kline]) -> Option<AnalysisResult>;
}
