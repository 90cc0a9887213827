// In crates/strategies/src/structure.rs

use crate::series::{tail, PriceSeries};

pub const STRUCTURE_LOOKBACK: usize = 20;
const MIN_STRUCTURE_BARS: usize = 5;

/// Swing-structure flags over the most recent bars.
///
/// The flags are independent: a bar sequence can, for example, print both a
/// higher high and a lower low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarketStructure {
    pub higher_high: bool,
    pub higher_low: bool,
    pub lower_high: bool,
    pub lower_low: bool,
}

impl MarketStructure {
    pub fn is_bullish(&self) -> bool {
        self.higher_high || self.higher_low
    }

    pub fn is_bearish(&self) -> bool {
        self.lower_high || self.lower_low
    }
}

/// Classifies the last three highs and lows inside the `lookback` window.
pub fn identify_structure(series: &PriceSeries, lookback: usize) -> MarketStructure {
    let highs = tail(&series.highs, lookback);
    let lows = tail(&series.lows, lookback);

    if highs.len() < MIN_STRUCTURE_BARS || lows.len() < MIN_STRUCTURE_BARS {
        return MarketStructure::default();
    }

    let [h3, h2, h1] = last_three(highs);
    let [l3, l2, l1] = last_three(lows);

    MarketStructure {
        higher_high: h1 > h2 && h2 > h3,
        higher_low: l1 > l2 && l2 > l3,
        lower_high: h1 < h2 && h2 < h3,
        lower_low: l1 < l2 && l2 < l3,
    }
}

fn last_three(values: &[f64]) -> [f64; 3] {
    let n = values.len();
    [values[n - 3], values[n - 2], values[n - 1]]
}
