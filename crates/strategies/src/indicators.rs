// In crates/strategies/src/indicators.rs

use crate::series::{tail, PriceSeries};
use core_types::EmaTrend;
use ta::indicators::{ExponentialMovingAverage as Ema, SimpleMovingAverage as Sma, TrueRange};
use ta::{DataItem, Next};

pub const ATR_PERIOD: usize = 14;
pub const RSI_PERIOD: usize = 14;
pub const EMA_FAST_PERIOD: usize = 13;
pub const EMA_SLOW_PERIOD: usize = 21;
pub const VOLUME_PERIOD: usize = 20;

/// RSI reported when there is no movement or not enough history.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Average True Range as the simple mean of the last `period` true ranges.
/// The first bar has no previous close, so its true range is just high - low.
///
/// Returns `0.0` with fewer than `period` bars, a malformed bar or a non-numeric result.
pub fn calculate_atr(series: &PriceSeries, period: usize) -> f64 {
    if period == 0 || series.len() < period {
        return 0.0;
    }
    let Ok(mut sma) = Sma::new(period) else {
        return 0.0;
    };
    let mut true_range = TrueRange::new();
    let mut atr = 0.0;
    for i in 0..series.len() {
        let Some(bar) = data_item(series, i) else {
            return 0.0;
        };
        atr = sma.next(true_range.next(&bar));
    }
    if atr.is_nan() { 0.0 } else { atr }
}

fn data_item(series: &PriceSeries, i: usize) -> Option<DataItem> {
    DataItem::builder()
        .open(series.closes[i])
        .high(series.highs[i])
        .low(series.lows[i])
        .close(series.closes[i])
        .volume(series.volumes[i])
        .build()
        .ok()
}

/// Wilder RSI of the closes over `period`.
///
/// Falls back to `NEUTRAL_RSI` when history is too short or the average loss is zero.
pub fn calculate_rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() <= period {
        return NEUTRAL_RSI;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let (seed, rest) = changes.split_at(period);

    let mut avg_gain = seed.iter().map(|c| c.max(0.0)).sum::<f64>() / period as f64;
    let mut avg_loss = seed.iter().map(|c| (-c).max(0.0)).sum::<f64>() / period as f64;

    // Wilder's smoothing
    let p = period as f64;
    for change in rest {
        avg_gain = (avg_gain * (p - 1.0) + change.max(0.0)) / p;
        avg_loss = (avg_loss * (p - 1.0) + (-change).max(0.0)) / p;
    }

    if avg_loss == 0.0 {
        return NEUTRAL_RSI;
    }
    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - 100.0 / (1.0 + rs);
    if rsi.is_finite() { rsi } else { NEUTRAL_RSI }
}

/// Fast/slow EMA state on the closes: `(trend, score)` with score +1 bullish, -1 bearish.
pub fn analyze_ema_cross(closes: &[f64]) -> (EmaTrend, i32) {
    if closes.len() < EMA_SLOW_PERIOD + 1 {
        return (EmaTrend::Neutral, 0);
    }

    match (closes.ema(EMA_FAST_PERIOD), closes.ema(EMA_SLOW_PERIOD)) {
        (Some(fast), Some(slow)) if fast > slow => (EmaTrend::Bullish, 1),
        (Some(_), Some(_)) => (EmaTrend::Bearish, -1),
        _ => (EmaTrend::Neutral, 0),
    }
}

/// Latest volume relative to the mean of the last `period` volumes.
///
/// `1.0` when the window is incomplete or its mean is not positive.
pub fn volume_ratio(volumes: &[f64], period: usize) -> f64 {
    let Some(latest) = volumes.last() else {
        return 1.0;
    };
    if period == 0 || volumes.len() < period {
        return 1.0;
    }
    let mean = tail(volumes, period).iter().sum::<f64>() / period as f64;
    if mean > 0.0 { latest / mean } else { 1.0 }
}

// Helper trait to easily calculate EMA on a slice of f64
pub trait EmaExt {
    fn ema(&self, period: usize) -> Option<f64>;
}

impl EmaExt for [f64] {
    fn ema(&self, period: usize) -> Option<f64> {
        if self.len() < period {
            return None;
        }
        let mut ema = Ema::new(period).ok()?;
        let mut last = None;
        self.iter().for_each(|v| {
            last = Some(ema.next(*v));
        });
        last
    }
}
