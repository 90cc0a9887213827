// In crates/strategies/src/types.rs

use serde::{Deserialize, Serialize};

/// Parameters of the technical-analysis scorer that shape the trade levels.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct TechnicalSettings {
    /// ATR multiple between consecutive take-profit targets (and to the stop).
    #[serde(default = "default_atr_multiplier")]
    pub atr_multiplier: f64,
    /// Half-width of the entry band as a fraction of the entry price.
    #[serde(default = "default_entry_range_pct")]
    pub entry_range_pct: f64,
}

impl Default for TechnicalSettings {
    fn default() -> Self {
        Self {
            atr_multiplier: default_atr_multiplier(),
            entry_range_pct: default_entry_range_pct(),
        }
    }
}

fn default_atr_multiplier() -> f64 { 1.0 }
fn default_entry_range_pct() -> f64 { 0.02 }
