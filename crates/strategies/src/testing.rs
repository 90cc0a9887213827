// Kline builders shared by the unit tests.

use core_types::Kline;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

pub fn kline(high: f64, low: f64, close: f64, volume: f64) -> Kline {
    Kline {
        open_time: 0,
        open: Decimal::from_f64(close).unwrap(),
        high: Decimal::from_f64(high).unwrap(),
        low: Decimal::from_f64(low).unwrap(),
        close: Decimal::from_f64(close).unwrap(),
        volume: Decimal::from_f64(volume).unwrap(),
        close_time: 0,
    }
}

/// Bars whose high/low sit one unit around the given closes, with constant volume.
pub fn from_closes(closes: &[f64]) -> Vec<Kline> {
    closes
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let mut k = kline(c + 1.0, c - 1.0, *c, 1_000.0);
            k.open_time = i as i64 * 3_600_000;
            k.close_time = k.open_time + 3_599_999;
            k
        })
        .collect()
}

pub fn flat(n: usize, price: f64) -> Vec<Kline> {
    (0..n).map(|_| kline(price, price, price, 1_000.0)).collect()
}

pub fn rising(n: usize) -> Vec<Kline> {
    let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
    from_closes(&closes)
}

pub fn falling(n: usize) -> Vec<Kline> {
    let closes: Vec<f64> = (0..n).map(|i| 500.0 - i as f64).collect();
    from_closes(&closes)
}
