// In crates/core-types/src/analysis.rs

use crate::types::{Action, EmaTrend, Trend};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Every chart shape the pattern detectors can report, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartPattern {
    SymmetricalTriangle,
    AscendingTriangle,
    DescendingTriangle,
    BroadeningAscending,
    BroadeningDescending,
    UptrendChannel,
    DowntrendChannel,
    RangingChannel,
    RisingWedge,
    FallingWedge,
    Gartley,
    Bat,
    Butterfly,
    Crab,
    Shark,
}

impl ChartPattern {
    pub const TRIANGLES: [ChartPattern; 5] = [
        ChartPattern::SymmetricalTriangle,
        ChartPattern::AscendingTriangle,
        ChartPattern::DescendingTriangle,
        ChartPattern::BroadeningAscending,
        ChartPattern::BroadeningDescending,
    ];

    pub const CHANNELS: [ChartPattern; 5] = [
        ChartPattern::UptrendChannel,
        ChartPattern::DowntrendChannel,
        ChartPattern::RangingChannel,
        ChartPattern::RisingWedge,
        ChartPattern::FallingWedge,
    ];

    pub const HARMONICS: [ChartPattern; 5] = [
        ChartPattern::Gartley,
        ChartPattern::Bat,
        ChartPattern::Butterfly,
        ChartPattern::Crab,
        ChartPattern::Shark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartPattern::SymmetricalTriangle => "symmetrical_triangle",
            ChartPattern::AscendingTriangle => "ascending_triangle",
            ChartPattern::DescendingTriangle => "descending_triangle",
            ChartPattern::BroadeningAscending => "broadening_ascending",
            ChartPattern::BroadeningDescending => "broadening_descending",
            ChartPattern::UptrendChannel => "uptrend_channel",
            ChartPattern::DowntrendChannel => "downtrend_channel",
            ChartPattern::RangingChannel => "ranging_channel",
            ChartPattern::RisingWedge => "rising_wedge",
            ChartPattern::FallingWedge => "falling_wedge",
            ChartPattern::Gartley => "gartley",
            ChartPattern::Bat => "bat",
            ChartPattern::Butterfly => "butterfly",
            ChartPattern::Crab => "crab",
            ChartPattern::Shark => "shark",
        }
    }

    pub fn is_harmonic(&self) -> bool {
        Self::HARMONICS.contains(self)
    }
}

impl fmt::Display for ChartPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detected / not-detected state for a family of chart patterns.
///
/// A detector always returns every key it owns, so an insufficient-history
/// result is an explicit all-false map rather than an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternFlags(BTreeMap<ChartPattern, bool>);

impl PatternFlags {
    /// Builds an all-false map over the given keys.
    pub fn with_keys(keys: &[ChartPattern]) -> Self {
        Self(keys.iter().map(|p| (*p, false)).collect())
    }

    pub fn set(&mut self, pattern: ChartPattern, detected: bool) {
        self.0.insert(pattern, detected);
    }

    pub fn is_set(&self, pattern: ChartPattern) -> bool {
        self.0.get(&pattern).copied().unwrap_or(false)
    }

    /// Folds another detector's flags into this map.
    pub fn merge(mut self, other: PatternFlags) -> Self {
        self.0.extend(other.0);
        self
    }

    /// The detected patterns, in canonical order.
    pub fn detected(&self) -> Vec<ChartPattern> {
        self.0
            .iter()
            .filter(|(_, detected)| **detected)
            .map(|(pattern, _)| *pattern)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChartPattern, bool)> + '_ {
        self.0.iter().map(|(p, d)| (*p, *d))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Entry band plus take-profit / stop-loss targets for a directional call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    pub ideal_entry: f64,
    pub entry_low: f64,
    pub entry_high: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: f64,
    pub sl: f64,
}

impl TradeLevels {
    /// Re-anchors the levels on an actual fill price.
    ///
    /// Targets keep their distance from the entry; the entry band is rebuilt
    /// around the new entry with the same percentage width.
    pub fn shifted_to(&self, actual_entry: f64, entry_range_pct: f64) -> Self {
        let delta = actual_entry - self.ideal_entry;
        Self {
            ideal_entry: actual_entry,
            entry_low: actual_entry * (1.0 - entry_range_pct),
            entry_high: actual_entry * (1.0 + entry_range_pct),
            tp1: self.tp1 + delta,
            tp2: self.tp2 + delta,
            tp3: self.tp3 + delta,
            sl: self.sl + delta,
        }
    }
}

/// The complete output of one scoring pass over a price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub action: Action,
    pub current_price: f64,
    pub rsi: f64,
    pub atr: f64,
    pub volume_ratio: f64,
    pub trend: Trend,
    pub ema_trend: EmaTrend,
    pub ema_score: i32,
    pub hh: bool,
    pub hl: bool,
    pub lh: bool,
    pub ll: bool,
    pub trend_score: i32,
    pub rsi_score: i32,
    pub volume_score: i32,
    pub pattern_score: i32,
    pub score: i32,
    pub detected_patterns: Vec<ChartPattern>,
    pub patterns: PatternFlags,
    /// Present iff `action` is not `Neutral`.
    pub levels: Option<TradeLevels>,
}

impl AnalysisResult {
    /// Sum of the individual scorer contributions; always equal to `score`.
    pub fn component_sum(&self) -> i32 {
        self.trend_score + self.rsi_score + self.volume_score + self.pattern_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_flags_keep_all_keys_and_canonical_order() {
        let mut harmonics = PatternFlags::with_keys(&ChartPattern::HARMONICS);
        harmonics.set(ChartPattern::Crab, true);
        let mut triangles = PatternFlags::with_keys(&ChartPattern::TRIANGLES);
        triangles.set(ChartPattern::BroadeningDescending, true);

        let all = harmonics.merge(triangles);

        assert_eq!(all.len(), 10);
        assert_eq!(
            all.detected(),
            vec![ChartPattern::BroadeningDescending, ChartPattern::Crab]
        );
        assert!(!all.is_set(ChartPattern::Bat));
        assert!(!all.is_set(ChartPattern::UptrendChannel));
    }

    #[test]
    fn flags_serialize_as_name_to_bool_map() {
        let mut flags = PatternFlags::with_keys(&[ChartPattern::RisingWedge]);
        flags.set(ChartPattern::RisingWedge, true);
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, r#"{"rising_wedge":true}"#);
    }

    #[test]
    fn shifting_levels_preserves_target_distances() {
        let levels = TradeLevels {
            ideal_entry: 100.0,
            entry_low: 98.0,
            entry_high: 102.0,
            tp1: 105.0,
            tp2: 110.0,
            tp3: 115.0,
            sl: 95.0,
        };

        let shifted = levels.shifted_to(104.0, 0.02);

        assert_eq!(shifted.ideal_entry, 104.0);
        assert_eq!(shifted.tp1 - shifted.ideal_entry, 5.0);
        assert_eq!(shifted.tp3 - shifted.ideal_entry, 15.0);
        assert_eq!(shifted.ideal_entry - shifted.sl, 5.0);
        assert!((shifted.entry_low - 101.92).abs() < 1e-9);
        assert!((shifted.entry_high - 106.08).abs() < 1e-9);
    }
}
