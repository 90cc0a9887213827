// In crates/strategies/src/levels.rs

use crate::types::TechnicalSettings;
use core_types::{Action, Side, TradeLevels};
use serde::Serialize;

/// Take-profit and stop-loss targets around an entry price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Targets {
    pub entry_price: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: f64,
    pub sl: f64,
}

impl Targets {
    /// Reward to the first target per unit of risk to the stop.
    pub fn risk_reward(&self) -> Option<f64> {
        let risk = (self.entry_price - self.sl).abs();
        if risk > 0.0 {
            Some((self.tp1 - self.entry_price).abs() / risk)
        } else {
            None
        }
    }
}

/// `entry ± atr × multiplier × n` for the three targets and the opposite for the stop.
pub fn calculate_custom_entry(side: Side, entry: f64, atr: f64, atr_multiplier: f64) -> Targets {
    let step = atr * atr_multiplier;
    let direction = match side {
        Side::Long => 1.0,
        Side::Short => -1.0,
    };
    Targets {
        entry_price: entry,
        tp1: entry + direction * step,
        tp2: entry + direction * step * 2.0,
        tp3: entry + direction * step * 3.0,
        sl: entry - direction * step,
    }
}

/// Entry band and targets for a directional call at the current close.
/// `None` for a neutral action.
pub fn calculate_levels(
    action: Action,
    current_price: f64,
    atr: f64,
    settings: &TechnicalSettings,
) -> Option<TradeLevels> {
    let side = action.side()?;
    let targets = calculate_custom_entry(side, current_price, atr, settings.atr_multiplier);
    Some(TradeLevels {
        ideal_entry: current_price,
        entry_low: current_price * (1.0 - settings.entry_range_pct),
        entry_high: current_price * (1.0 + settings.entry_range_pct),
        tp1: targets.tp1,
        tp2: targets.tp2,
        tp3: targets.tp3,
        sl: targets.sl,
    })
}
