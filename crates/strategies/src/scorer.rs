// In crates/strategies/src/scorer.rs

use crate::structure::MarketStructure;
use core_types::{ChartPattern, PatternFlags};

/// Score contribution per chart pattern, harmonic buckets aside.
const PATTERN_WEIGHTS: [(ChartPattern, i32); 7] = [
    (ChartPattern::AscendingTriangle, 3),
    (ChartPattern::DescendingTriangle, -3),
    (ChartPattern::SymmetricalTriangle, 1),
    (ChartPattern::UptrendChannel, 2),
    (ChartPattern::DowntrendChannel, -2),
    (ChartPattern::FallingWedge, 2),
    (ChartPattern::RisingWedge, -2),
];
/// Each detected harmonic bucket adds this much; only one is ever set.
const HARMONIC_WEIGHT: i32 = 1;

/// The four additive parts of the aggregate score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub trend_score: i32,
    pub rsi_score: i32,
    pub volume_score: i32,
    pub pattern_score: i32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i32 {
        self.trend_score + self.rsi_score + self.volume_score + self.pattern_score
    }
}

/// +2 for a bullish structure, -2 for a bearish one (both can apply), plus the EMA score.
pub fn trend_score(structure: &MarketStructure, ema_score: i32) -> i32 {
    let mut score = 0;
    if structure.is_bullish() {
        score += 2;
    }
    if structure.is_bearish() {
        score -= 2;
    }
    // The signed EMA score is added as-is for both a bullish and a bearish cross.
    score + ema_score
}

pub fn pattern_score(flags: &PatternFlags) -> i32 {
    let weighted: i32 = PATTERN_WEIGHTS
        .iter()
        .filter(|(pattern, _)| flags.is_set(*pattern))
        .map(|(_, weight)| weight)
        .sum();
    let harmonic = flags
        .iter()
        .filter(|(pattern, detected)| *detected && pattern.is_harmonic())
        .count() as i32
        * HARMONIC_WEIGHT;
    weighted + harmonic
}

/// Mid-range RSI is mildly bullish, oversold strongly bullish, overbought bearish.
/// The exact 30 / 70 boundaries score nothing.
pub fn rsi_score(rsi: f64) -> i32 {
    if rsi > 30.0 && rsi < 70.0 {
        1
    } else if rsi < 30.0 {
        2
    } else if rsi > 70.0 {
        -2
    } else {
        0
    }
}

pub fn volume_score(volume_ratio: f64) -> i32 {
    if volume_ratio > 1.2 {
        1
    } else if volume_ratio > 0.8 {
        0
    } else {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structure(hh: bool, hl: bool, lh: bool, ll: bool) -> MarketStructure {
        MarketStructure { higher_high: hh, higher_low: hl, lower_high: lh, lower_low: ll }
    }

    #[test]
    fn trend_score_accumulates_structure_and_ema() {
        assert_eq!(trend_score(&structure(true, true, false, false), 1), 3);
        assert_eq!(trend_score(&structure(false, false, true, false), -1), -3);
        assert_eq!(trend_score(&structure(true, false, false, true), 1), 1);
        assert_eq!(trend_score(&MarketStructure::default(), 0), 0);
        assert_eq!(trend_score(&structure(false, true, false, false), -1), 1);
    }

    #[test]
    fn pattern_score_weights_each_detected_shape() {
        let mut flags = PatternFlags::with_keys(&ChartPattern::TRIANGLES)
            .merge(PatternFlags::with_keys(&ChartPattern::CHANNELS))
            .merge(PatternFlags::with_keys(&ChartPattern::HARMONICS));
        assert_eq!(pattern_score(&flags), 0);

        flags.set(ChartPattern::AscendingTriangle, true);
        flags.set(ChartPattern::RisingWedge, true);
        flags.set(ChartPattern::Bat, true);
        assert_eq!(pattern_score(&flags), 3 - 2 + 1);

        flags.set(ChartPattern::DowntrendChannel, true);
        flags.set(ChartPattern::SymmetricalTriangle, true);
        // ranging and broadening shapes carry no weight
        flags.set(ChartPattern::RangingChannel, true);
        flags.set(ChartPattern::BroadeningAscending, true);
        assert_eq!(pattern_score(&flags), 3 - 2 + 1 - 2 + 1);
    }

    #[test]
    fn rsi_bands() {
        assert_eq!(rsi_score(50.0), 1);
        assert_eq!(rsi_score(12.0), 2);
        assert_eq!(rsi_score(85.0), -2);
        assert_eq!(rsi_score(30.0), 0);
        assert_eq!(rsi_score(70.0), 0);
    }

    #[test]
    fn volume_bands() {
        assert_eq!(volume_score(1.5), 1);
        assert_eq!(volume_score(1.2), 0);
        assert_eq!(volume_score(1.0), 0);
        assert_eq!(volume_score(0.8), -1);
    }

    #[test]
    fn total_is_the_sum_of_parts() {
        let breakdown = ScoreBreakdown { trend_score: 3, rsi_score: -2, volume_score: 1, pattern_score: -4 };
        assert_eq!(breakdown.total(), -2);
    }
}
