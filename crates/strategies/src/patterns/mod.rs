// In crates/strategies/src/patterns/mod.rs

//! Chart-shape detectors. Each one fits straight lines (or a single price
//! change) to the tail of the series and returns flags for its own family of
//! patterns, all false when the series is too short.

pub mod channel;
pub mod harmonic;
pub mod triangle;

pub use channel::detect_channel_wedge_patterns;
pub use harmonic::detect_harmonic_patterns;
pub use triangle::detect_triangle_patterns;

use crate::series::PriceSeries;
use core_types::PatternFlags;
use ta::indicators::StandardDeviation;
use ta::Next;

/// Runs every detector with its default window and merges the flags.
pub fn detect_all(series: &PriceSeries) -> PatternFlags {
    detect_triangle_patterns(series, triangle::TRIANGLE_PERIOD)
        .merge(detect_channel_wedge_patterns(series, channel::CHANNEL_PERIOD))
        .merge(detect_harmonic_patterns(series, harmonic::HARMONIC_PERIOD))
}

/// Least-squares slope of `values` against their index.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let centre = 0.5 * (n - 1) as f64;
    let (num, denom) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, denom), (i, v)| {
            let coef = i as f64 - centre;
            (num + coef * v, denom + coef * coef)
        });
    num / denom
}

/// Population standard deviation over the whole slice.
pub fn std_dev(values: &[f64]) -> f64 {
    let Ok(mut sd) = StandardDeviation::new(values.len()) else {
        return 0.0;
    };
    values.iter().fold(0.0, |_, v| sd.next(*v))
}
