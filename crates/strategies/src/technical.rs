// In crates/strategies/src/technical.rs

use crate::indicators::{
    analyze_ema_cross, calculate_atr, calculate_rsi, volume_ratio, ATR_PERIOD, RSI_PERIOD,
    VOLUME_PERIOD,
};
use crate::levels::{calculate_levels, calculate_custom_entry, Targets};
use crate::scorer::{pattern_score, rsi_score, trend_score, volume_score, ScoreBreakdown};
use crate::series::PriceSeries;
use crate::structure::{identify_structure, STRUCTURE_LOOKBACK};
use crate::types::TechnicalSettings;
use crate::{patterns, Strategy, MIN_BARS};
use core_types::{Action, AnalysisResult, Kline, Side, Trend};

/// Rule-based technical scorer: indicators, swing structure and chart
/// patterns folded into one signed score, with ATR-spaced trade levels.
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicalAnalysis {
    settings: TechnicalSettings,
}

impl TechnicalAnalysis {
    pub fn new(settings: TechnicalSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TechnicalSettings {
        &self.settings
    }

    /// ATR(14) of the series, `0.0` when it is too short.
    pub fn atr(&self, klines: &[Kline]) -> f64 {
        calculate_atr(&PriceSeries::from_klines(klines), ATR_PERIOD)
    }

    /// Targets for a user-chosen entry price, spaced by the series' current ATR.
    /// `None` when the series is shorter than the analysis minimum.
    pub fn custom_entry(&self, klines: &[Kline], side: Side, entry_price: f64) -> Option<Targets> {
        if klines.len() < MIN_BARS {
            return None;
        }
        let atr = self.atr(klines);
        Some(calculate_custom_entry(side, entry_price, atr, self.settings.atr_multiplier))
    }
}

impl Strategy for TechnicalAnalysis {
    fn name(&self) -> &'static str {
        "TechnicalAnalysis"
    }

    fn analyze(&self, klines: &[Kline]) -> Option<AnalysisResult> {
        if klines.len() < MIN_BARS {
            return None;
        }

        let series = PriceSeries::from_klines(klines);
        let current_price = series.last_close()?;

        // --- Indicators ---
        let rsi = calculate_rsi(&series.closes, RSI_PERIOD);
        let atr = calculate_atr(&series, ATR_PERIOD);
        let (ema_trend, ema_score) = analyze_ema_cross(&series.closes);
        let volume_ratio = volume_ratio(&series.volumes, VOLUME_PERIOD);

        // --- Detectors ---
        let structure = identify_structure(&series, STRUCTURE_LOOKBACK);
        let patterns = patterns::detect_all(&series);

        // --- Scoring ---
        let breakdown = ScoreBreakdown {
            trend_score: trend_score(&structure, ema_score),
            rsi_score: rsi_score(rsi),
            volume_score: volume_score(volume_ratio),
            pattern_score: pattern_score(&patterns),
        };
        let score = breakdown.total();
        let action = Action::from_score(score);
        let levels = calculate_levels(action, current_price, atr, &self.settings);

        tracing::debug!(
            strategy = self.name(),
            %action,
            score,
            trend_score = breakdown.trend_score,
            pattern_score = breakdown.pattern_score,
            rsi,
            atr,
            "Series scored."
        );

        Some(AnalysisResult {
            action,
            current_price,
            rsi,
            atr,
            volume_ratio,
            trend: Trend::from_score(breakdown.trend_score),
            ema_trend,
            ema_score,
            hh: structure.higher_high,
            hl: structure.higher_low,
            lh: structure.lower_high,
            ll: structure.lower_low,
            trend_score: breakdown.trend_score,
            rsi_score: breakdown.rsi_score,
            volume_score: breakdown.volume_score,
            pattern_score: breakdown.pattern_score,
            score,
            detected_patterns: patterns.detected(),
            patterns,
            levels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use core_types::{ChartPattern, EmaTrend};
    use rust_decimal_macros::dec;

    fn engine() -> TechnicalAnalysis {
        TechnicalAnalysis::new(TechnicalSettings::default())
    }

    #[test]
    fn reports_its_name() {
        assert_eq!(engine().name(), "TechnicalAnalysis");
    }

    #[test]
    fn short_series_yield_no_result() {
        assert!(engine().analyze(&testing::rising(49)).is_none());
        assert!(engine().analyze(&[]).is_none());
        assert!(engine().analyze(&testing::rising(50)).is_some());
    }

    #[test]
    fn flat_series_has_no_directional_evidence() {
        let result = engine().analyze(&testing::flat(60, 100.0)).unwrap();

        assert_eq!(result.rsi, 50.0);
        assert_eq!(result.volume_ratio, 1.0);
        assert_eq!(result.atr, 0.0);
        assert!(!(result.hh || result.hl || result.lh || result.ll));
        assert_eq!(result.rsi_score, 1);
        assert_eq!(result.volume_score, 0);
        // flat edges read as a ranging channel and the zero change as the first harmonic bucket
        assert_eq!(
            result.detected_patterns,
            vec![ChartPattern::RangingChannel, ChartPattern::Gartley]
        );
        assert_eq!(result.pattern_score, 1);
        assert_eq!(result.trend_score, result.ema_score);
        // equal EMAs read as bearish: -1 + 1 (RSI) + 1 (Gartley)
        assert_eq!(result.ema_trend, EmaTrend::Bearish);
        assert_eq!(result.score, 1);
        assert_eq!(result.action, Action::Long);
        assert_eq!(result.score, result.component_sum());
    }

    #[test]
    fn steady_uptrend_scores_long() {
        let result = engine().analyze(&testing::rising(60)).unwrap();

        assert!(result.hh && result.hl && !result.lh && !result.ll);
        assert_eq!(result.ema_trend, EmaTrend::Bullish);
        assert_eq!(result.trend_score, 3);
        assert_eq!(result.trend, Trend::Bullish);
        assert_eq!(result.rsi_score, 1);
        assert_eq!(result.volume_score, 0);
        assert!(result.patterns.is_set(ChartPattern::UptrendChannel));
        assert!(result.patterns.is_set(ChartPattern::Shark));
        assert_eq!(result.pattern_score, 3);
        assert_eq!(result.score, 7);
        assert_eq!(result.action, Action::Long);

        let levels = result.levels.unwrap();
        assert_eq!(result.current_price, 159.0);
        assert_eq!(result.atr, 2.0);
        assert_eq!((levels.tp1, levels.tp2, levels.tp3, levels.sl), (161.0, 163.0, 165.0, 157.0));
    }

    #[test]
    fn steady_downtrend_scores_short() {
        let result = engine().analyze(&testing::falling(70)).unwrap();

        assert!(result.lh && result.ll);
        assert_eq!(result.trend_score, -3);
        assert_eq!(result.rsi, 0.0);
        assert_eq!(result.rsi_score, 2);
        assert!(result.patterns.is_set(ChartPattern::DowntrendChannel));
        assert!(result.patterns.is_set(ChartPattern::Butterfly));
        assert_eq!(result.pattern_score, -1);
        assert_eq!(result.score, -2);
        assert_eq!(result.action, Action::Short);

        let levels = result.levels.unwrap();
        assert_eq!((levels.tp1, levels.sl), (429.0, 433.0));
    }

    #[test]
    fn volume_spike_adds_a_point() {
        let mut klines = testing::rising(60);
        klines.last_mut().unwrap().volume = dec!(5000);
        let result = engine().analyze(&klines).unwrap();
        assert_eq!(result.volume_score, 1);
        assert_eq!(result.score, 8);
    }

    #[test]
    fn levels_follow_the_action() {
        for klines in [testing::rising(80), testing::falling(55), testing::flat(70, 3.0)] {
            let result = engine().analyze(&klines).unwrap();
            assert_eq!(result.levels.is_some(), result.action != Action::Neutral);
            assert_eq!(result.score, result.component_sum());
            assert_eq!(result.patterns.len(), 15);
        }
    }

    #[test]
    fn exactly_one_harmonic_bucket_is_set() {
        for n in [50, 64, 120, 200] {
            let closes: Vec<f64> = (0..n).map(|i| 100.0 + ((i * 7) % 13) as f64).collect();
            let result = engine().analyze(&testing::from_closes(&closes)).unwrap();
            let harmonics = ChartPattern::HARMONICS
                .iter()
                .filter(|p| result.patterns.is_set(**p))
                .count();
            assert_eq!(harmonics, 1, "series of {n} bars");
        }
    }

    #[test]
    fn custom_entry_uses_series_atr() {
        let klines = testing::rising(60);
        let targets = engine().custom_entry(&klines, Side::Long, 150.0).unwrap();
        assert_eq!((targets.tp1, targets.tp2, targets.tp3, targets.sl), (152.0, 154.0, 156.0, 148.0));
        assert!(engine().custom_entry(&klines[..40], Side::Long, 150.0).is_none());
    }
}
