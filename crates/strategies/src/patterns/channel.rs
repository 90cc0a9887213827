// In crates/strategies/src/patterns/channel.rs

use super::linear_slope;
use crate::series::{tail, PriceSeries};
use core_types::{ChartPattern, PatternFlags};

pub const CHANNEL_PERIOD: usize = 20;

/// Absolute slope (price units per bar) under which both edges count as flat.
pub const RANGING_SLOPE_THRESHOLD: f64 = 0.001;
/// How much steeper the leading edge of a wedge must be than the trailing one.
const WEDGE_STEEPNESS: f64 = 1.5;

/// Regression channels and wedges over the last `period` highs, lows and closes.
pub fn detect_channel_wedge_patterns(series: &PriceSeries, period: usize) -> PatternFlags {
    let mut flags = PatternFlags::with_keys(&ChartPattern::CHANNELS);
    if period < 2 || series.len() < period * 2 {
        return flags;
    }

    let high_slope = linear_slope(tail(&series.highs, period));
    let low_slope = linear_slope(tail(&series.lows, period));
    let close_slope = linear_slope(tail(&series.closes, period));

    flags.set(
        ChartPattern::UptrendChannel,
        high_slope > 0.0 && low_slope > 0.0 && close_slope > 0.0,
    );
    flags.set(
        ChartPattern::DowntrendChannel,
        high_slope < 0.0 && low_slope < 0.0 && close_slope < 0.0,
    );
    flags.set(
        ChartPattern::RangingChannel,
        high_slope.abs() < RANGING_SLOPE_THRESHOLD && low_slope.abs() < RANGING_SLOPE_THRESHOLD,
    );
    flags.set(
        ChartPattern::RisingWedge,
        high_slope > 0.0 && low_slope > 0.0 && high_slope > low_slope * WEDGE_STEEPNESS,
    );
    flags.set(
        ChartPattern::FallingWedge,
        high_slope < 0.0 && low_slope < 0.0 && low_slope.abs() > high_slope.abs() * WEDGE_STEEPNESS,
    );

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, kline};

    fn lines(high: impl Fn(f64) -> f64, low: impl Fn(f64) -> f64) -> PriceSeries {
        let bars: Vec<_> = (0..40)
            .map(|i| {
                let (h, l) = (high(i as f64), low(i as f64));
                kline(h, l, (h + l) / 2.0, 1_000.0)
            })
            .collect();
        PriceSeries::from_klines(&bars)
    }

    #[test]
    fn parallel_rising_edges_are_an_uptrend_channel() {
        let flags = detect_channel_wedge_patterns(
            &PriceSeries::from_klines(&testing::rising(40)),
            CHANNEL_PERIOD,
        );
        assert_eq!(flags.detected(), vec![ChartPattern::UptrendChannel]);
    }

    #[test]
    fn parallel_falling_edges_are_a_downtrend_channel() {
        let flags = detect_channel_wedge_patterns(
            &PriceSeries::from_klines(&testing::falling(40)),
            CHANNEL_PERIOD,
        );
        assert_eq!(flags.detected(), vec![ChartPattern::DowntrendChannel]);
    }

    #[test]
    fn faster_highs_make_a_rising_wedge() {
        let flags = detect_channel_wedge_patterns(&lines(|i| 110.0 + 2.0 * i, |i| 100.0 + i), CHANNEL_PERIOD);
        assert!(flags.is_set(ChartPattern::RisingWedge));
        assert!(flags.is_set(ChartPattern::UptrendChannel));
        assert!(!flags.is_set(ChartPattern::FallingWedge));
    }

    #[test]
    fn faster_lows_make_a_falling_wedge() {
        let flags = detect_channel_wedge_patterns(&lines(|i| 300.0 - i, |i| 280.0 - 2.0 * i), CHANNEL_PERIOD);
        assert!(flags.is_set(ChartPattern::FallingWedge));
        assert!(flags.is_set(ChartPattern::DowntrendChannel));
        assert!(!flags.is_set(ChartPattern::RisingWedge));
    }

    #[test]
    fn flat_edges_are_ranging() {
        let flags = detect_channel_wedge_patterns(
            &PriceSeries::from_klines(&testing::flat(40, 100.0)),
            CHANNEL_PERIOD,
        );
        assert_eq!(flags.detected(), vec![ChartPattern::RangingChannel]);
    }

    #[test]
    fn short_series_reports_all_false() {
        let flags = detect_channel_wedge_patterns(
            &PriceSeries::from_klines(&testing::rising(30)),
            CHANNEL_PERIOD,
        );
        assert_eq!(flags.len(), 5);
        assert!(flags.detected().is_empty());
    }
}
