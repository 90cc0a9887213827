// In crates/strategies/src/patterns/harmonic.rs

use crate::series::{tail, PriceSeries};
use core_types::{ChartPattern, PatternFlags};

pub const HARMONIC_PERIOD: usize = 50;

/// Simplified harmonic labelling.
///
/// This is not Fibonacci-ratio matching: the absolute fractional change of the
/// close over `period` bars is bucketed (<5%, 5-10%, 10-15%, 15-20%, >=20%) onto
/// gartley, bat, butterfly, crab and shark. Exactly one flag is set once the
/// series holds `period` bars; anything non-numeric lands in the last bucket.
pub fn detect_harmonic_patterns(series: &PriceSeries, period: usize) -> PatternFlags {
    let mut flags = PatternFlags::with_keys(&ChartPattern::HARMONICS);
    if period < 2 || series.len() < period {
        return flags;
    }

    let closes = tail(&series.closes, period);
    let first = closes[0];
    let last = closes[closes.len() - 1];
    let change = ((last - first) / first).abs();

    let pattern = match change {
        c if c < 0.05 => ChartPattern::Gartley,
        c if c < 0.10 => ChartPattern::Bat,
        c if c < 0.15 => ChartPattern::Butterfly,
        c if c < 0.20 => ChartPattern::Crab,
        _ => ChartPattern::Shark,
    };
    flags.set(pattern, true);

    flags
}
