use crate::services::indicators::{IndicatorFrame, IndicatorSnapshot};
use crate::services::state::Phase;
use crate::value_objects::position::Position;
use crate::value_objects::trading_mode::ModeConfig;
use serde::{Deserialize, Serialize};

/// Second level track for new entries sitting far above the pullback band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakoutLevels {
    pub trigger: f64,
    pub buy_low: f64,
    pub buy_high: f64,
    pub sl0: f64,
    pub tp1: f64,
}

/// Reference prices for one evaluation. Absent fields mean "not applicable" and make
/// the classifier skip the rules that depend on them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub buy_low: Option<f64>,
    pub buy_high: Option<f64>,
    pub tp0: Option<f64>,
    pub tp1: Option<f64>,
    pub tp2: Option<f64>,
    pub sl0: Option<f64>,
    pub sl1: Option<f64>,
    pub recovery: Option<f64>,
    pub breakout: Option<BreakoutLevels>,
}

impl LevelSet {
    /// Levels as they should be shown for a phase: a broken structure keeps only stops and recovery.
    pub fn for_phase(&self, phase: Phase) -> LevelSet {
        if phase != Phase::StructureBroken {
            return *self;
        }
        LevelSet {
            sl0: self.sl0,
            sl1: self.sl1,
            recovery: self.recovery,
            ..LevelSet::default()
        }
    }

    pub fn take_profits(&self) -> Vec<f64> {
        [self.tp0, self.tp1, self.tp2].into_iter().flatten().collect()
    }

    pub fn stops(&self) -> Vec<f64> {
        [self.sl0, self.sl1].into_iter().flatten().collect()
    }
}

pub fn pullback_band(price_ref: f64, ma_mid: f64, bb_lower: f64) -> (f64, f64) {
    let (a, b) = if price_ref > ma_mid {
        (ma_mid * 0.98, ma_mid * 1.01)
    } else {
        (bb_lower * 0.98, bb_lower * 1.02)
    };
    // A very wide band can push the lower Bollinger line below zero.
    (a.min(b), a.max(b))
}

pub fn recovery_level(buy_high: Option<f64>, ma_mid: Option<f64>) -> Option<f64> {
    [
        buy_high.filter(|v| v.is_finite()).map(|v| v * 1.005),
        ma_mid.filter(|v| v.is_finite()).map(|v| v * 1.01),
    ]
    .into_iter()
    .flatten()
    .reduce(f64::max)
}

fn targets(
    frame: &IndicatorFrame,
    snapshot: &IndicatorSnapshot,
    mode: &ModeConfig,
    anchor: f64,
) -> Option<(f64, f64, f64)> {
    let price = snapshot.close;
    let swing_high = frame.recent_high(mode.lookback_short)?;
    let box_high = frame.recent_high(mode.lookback_long)?;

    let floor = (swing_high * 0.995)
        .max(box_high * 0.99)
        .max(snapshot.bb_upper * 0.98);
    let mut tp1 = (anchor * (1.0 + mode.target_pct)).max(floor);
    if tp1 <= price {
        tp1 = price * (1.0 + mode.target_pct);
    }

    let (near, extend) = if snapshot.rsi > 70.0 {
        (0.5, 0.4)
    } else {
        (0.6, 0.7)
    };
    let tp0 = price + (tp1 - price) * near;
    let tp2 = tp1 + (tp1 - price) * extend;
    Some((tp0, tp1, tp2))
}

/// Structure-based stop for holders without a known average price.
fn trend_stop(
    frame: &IndicatorFrame,
    snapshot: &IndicatorSnapshot,
    mode: &ModeConfig,
) -> Option<f64> {
    let price = snapshot.close;
    let swing_low = frame.recent_low(mode.lookback_short)?;
    let box_low = frame.recent_low(mode.lookback_long)?;

    let candidates = [
        (swing_low < price).then_some(swing_low * 0.995),
        (snapshot.ma_mid < price).then_some(snapshot.ma_mid * 0.99),
        (box_low < price).then_some(box_low * 0.995),
        (snapshot.atr > 0.0).then_some(price - mode.atr_mult * snapshot.atr),
    ];
    let best = candidates
        .into_iter()
        .flatten()
        .filter(|v| *v < price)
        .reduce(f64::max);
    Some(best.unwrap_or(box_low * 0.985))
}

fn breakout(
    frame: &IndicatorFrame,
    snapshot: &IndicatorSnapshot,
    mode: &ModeConfig,
) -> Option<BreakoutLevels> {
    let swing_high = frame.recent_high(mode.lookback_short)?;
    let trigger = swing_high * 1.001;

    let mut sl0 = trigger * (1.0 - mode.breakout_floor_pct);
    if snapshot.atr > 0.0 {
        sl0 = sl0.min(trigger - mode.breakout_atr_mult * snapshot.atr);
    }
    let sl0 = sl0.max(0.01);
    let tp1 = trigger + mode.breakout_rr_mult * (trigger - sl0);

    Some(BreakoutLevels {
        trigger,
        buy_low: trigger,
        buy_high: trigger * 1.01,
        sl0,
        tp1,
    })
}

/// Computes entry band, take-profit tiers, stops, recovery and breakout levels from the
/// latest row of `frame`.
///
/// `price_ref` (e.g. an extended-hours quote) only picks the entry-band branch; targets and
/// stops are anchored on the daily structure. Returns `None` when the frame is empty or its
/// last snapshot is not finite.
pub fn compute_levels(
    frame: &IndicatorFrame,
    mode: &ModeConfig,
    position: &Position,
    price_ref: Option<f64>,
) -> Option<LevelSet> {
    let snapshot = frame.snapshot()?;
    if !snapshot.is_finite() || snapshot.close <= 0.0 {
        return None;
    }
    let price_ref = price_ref
        .filter(|p| p.is_finite() && *p > 0.0)
        .unwrap_or(snapshot.close);

    let (buy_low, buy_high) = pullback_band(price_ref, snapshot.ma_mid, snapshot.bb_lower);

    let entry = if position.is_holding() {
        position.entry_price()
    } else {
        None
    };
    let anchor = entry.unwrap_or(snapshot.close);
    let (tp0, tp1, tp2) = targets(frame, &snapshot, mode, anchor)?;

    let sl0 = match (position.is_holding(), entry) {
        (true, Some(avg)) => avg * (1.0 - mode.stop_pct),
        (true, None) => trend_stop(frame, &snapshot, mode)?,
        (false, _) => buy_low * (1.0 - mode.entry_stop_pct),
    };
    let box_low = frame.recent_low(mode.lookback_long)?;
    let structural_floor = (box_low * 0.985).min(snapshot.bb_lower * 0.98);
    let sl1 = (sl0 * 0.97).min(structural_floor).min(sl0);

    let levels = LevelSet {
        buy_low: Some(buy_low),
        buy_high: Some(buy_high),
        tp0: Some(tp0),
        tp1: Some(tp1),
        tp2: Some(tp2),
        sl0: Some(sl0),
        sl1: Some(sl1),
        recovery: recovery_level(Some(buy_high), Some(snapshot.ma_mid)),
        breakout: breakout(frame, &snapshot, mode),
    };
    Some(levels)
}
