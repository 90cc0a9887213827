// In crates/strategies/src/patterns/triangle.rs

use super::{linear_slope, std_dev};
use crate::series::{tail, PriceSeries};
use core_types::{ChartPattern, PatternFlags};

pub const TRIANGLE_PERIOD: usize = 20;

/// Upper bound on |high slope / low slope| for a symmetrical triangle.
const SYMMETRY_RATIO: f64 = 1.5;
/// A triangle edge is flat when its dispersion shrank below this share of the prior window's.
const FLAT_EDGE_RATIO: f64 = 0.7;

/// Triangle and broadening formations over the last `period` bars.
///
/// The flat-edge test for ascending/descending triangles compares the recent
/// window's dispersion against the `period` bars before it, so `2 * period`
/// bars are required. Comparing a window with itself could never fire, which
/// would leave both patterns permanently unset.
pub fn detect_triangle_patterns(series: &PriceSeries, period: usize) -> PatternFlags {
    let mut flags = PatternFlags::with_keys(&ChartPattern::TRIANGLES);
    let n = series.len();
    if period < 2 || n < period * 2 {
        return flags;
    }

    let highs = tail(&series.highs, period);
    let lows = tail(&series.lows, period);
    let prior_highs = &series.highs[n - 2 * period..n - period];
    let prior_lows = &series.lows[n - 2 * period..n - period];

    let high_slope = linear_slope(highs);
    let low_slope = linear_slope(lows);

    // Converging trendlines of similar steepness
    if high_slope < 0.0 && low_slope > 0.0 && (high_slope / low_slope).abs() < SYMMETRY_RATIO {
        flags.set(ChartPattern::SymmetricalTriangle, true);
    }

    // Flat resistance, rising support
    if std_dev(highs) < std_dev(prior_highs) * FLAT_EDGE_RATIO && low_slope > 0.0 {
        flags.set(ChartPattern::AscendingTriangle, true);
    }

    // Flat support, falling resistance
    if std_dev(lows) < std_dev(prior_lows) * FLAT_EDGE_RATIO && high_slope < 0.0 {
        flags.set(ChartPattern::DescendingTriangle, true);
    }

    if high_slope > 0.0 && low_slope < 0.0 {
        flags.set(ChartPattern::BroadeningAscending, true);
    } else if high_slope < 0.0 && low_slope > 0.0 {
        flags.set(ChartPattern::BroadeningDescending, true);
    }

    flags
}
