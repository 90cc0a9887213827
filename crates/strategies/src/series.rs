// In crates/strategies/src/series.rs

use core_types::Kline;
use num_traits::cast::ToPrimitive;
use rust_decimal::Decimal;

/// Column-oriented `f64` view of a kline series, in chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl PriceSeries {
    pub fn from_klines(klines: &[Kline]) -> Self {
        Self {
            highs: column(klines, |k| k.high),
            lows: column(klines, |k| k.low),
            closes: column(klines, |k| k.close),
            volumes: column(klines, |k| k.volume),
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }
}

fn column(klines: &[Kline], field: impl Fn(&Kline) -> Decimal) -> Vec<f64> {
    klines
        .iter()
        .map(|k| field(k).to_f64().unwrap_or(0.0))
        .collect()
}

/// The last `n` values of a column (the whole column if it is shorter).
pub fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn columns_follow_the_klines() {
        let series = PriceSeries::from_klines(&testing::rising(3));
        assert!(!series.is_empty());
        assert_eq!(series.len(), 3);
        assert_eq!(series.highs, vec![101.0, 102.0, 103.0]);
        assert_eq!(series.lows, vec![99.0, 100.0, 101.0]);
        assert_eq!(series.last_close(), Some(102.0));
        assert_eq!(tail(&series.closes, 2), &[101.0, 102.0]);
    }

    #[test]
    fn an_empty_series_has_no_last_close() {
        let series = PriceSeries::from_klines(&[]);
        assert!(series.is_empty());
        assert_eq!(series.last_close(), None);
    }
}
