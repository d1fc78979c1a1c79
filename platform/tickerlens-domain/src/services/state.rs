use crate::services::indicators::IndicatorSnapshot;
use crate::services::levels::{recovery_level, LevelSet};
use crate::value_objects::position::Position;
use crate::value_objects::trading_mode::ModeConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    DataInsufficient,
    StructureBroken,
    BreakoutWait,
    BreakoutEntry,
    BreakoutChase,
    FailSoft,
    #[serde(rename = "entry_1")]
    Entry1,
    WaitNear,
    TpZone,
    WaitFar,
    Wait,
    HoldDefSoft,
    HoldTp,
    HoldTrend,
    HoldAmb,
    Hold,
}

impl Phase {
    pub fn tag(&self) -> &'static str {
        match self {
            Phase::DataInsufficient => "data_insufficient",
            Phase::StructureBroken => "structure_broken",
            Phase::BreakoutWait => "breakout_wait",
            Phase::BreakoutEntry => "breakout_entry",
            Phase::BreakoutChase => "breakout_chase",
            Phase::FailSoft => "fail_soft",
            Phase::Entry1 => "entry_1",
            Phase::WaitNear => "wait_near",
            Phase::TpZone => "tp_zone",
            Phase::WaitFar => "wait_far",
            Phase::Wait => "wait",
            Phase::HoldDefSoft => "hold_def_soft",
            Phase::HoldTp => "hold_tp",
            Phase::HoldTrend => "hold_trend",
            Phase::HoldAmb => "hold_amb",
            Phase::Hold => "hold",
        }
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            Phase::DataInsufficient => "Data insufficient",
            Phase::StructureBroken => "Structure broken -> wait for recovery",
            Phase::BreakoutWait => "Breakout pending (trend resumption)",
            Phase::BreakoutEntry => "Breakout entry zone",
            Phase::BreakoutChase => "Extended after breakout (do not chase)",
            Phase::FailSoft => "Entry thesis invalidated",
            Phase::Entry1 => "First entry zone (pullback)",
            Phase::WaitNear => "Approaching entry zone",
            Phase::TpZone => "Resistance zone (caution chasing)",
            Phase::WaitFar => "Waiting (above entry zone)",
            Phase::Wait => "Waiting",
            Phase::HoldDefSoft => "Defend position",
            Phase::HoldTp => "Partial take-profit zone",
            Phase::HoldTrend => "Hold (trend intact)",
            Phase::HoldAmb => "Ambiguous zone (watch)",
            Phase::Hold => "Holding",
        }
    }

    pub fn is_holder_phase(&self) -> bool {
        matches!(
            self,
            Phase::HoldDefSoft | Phase::HoldTp | Phase::HoldTrend | Phase::HoldAmb | Phase::Hold
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub phase: Phase,
    pub action: String,
    pub recover_level: Option<f64>,
}

impl Classification {
    pub fn state_name(&self) -> &'static str {
        self.phase.state_name()
    }

    pub fn phase_tag(&self) -> &'static str {
        self.phase.tag()
    }

    fn new(phase: Phase, action: impl Into<String>, recover_level: Option<f64>) -> Self {
        Self {
            phase,
            action: action.into(),
            recover_level,
        }
    }
}

fn recover_hint(recover_level: Option<f64>, verb: &str) -> String {
    match recover_level {
        Some(level) => format!("(recovery check: {verb} above {level:.2})"),
        None => "(recovery level needs to be recomputed)".to_string(),
    }
}

/// Maps the latest snapshot, position and levels to a phase and an action line.
///
/// Rules are checked in priority order and the first match wins. The function keeps no
/// state between calls. Missing levels skip the rules that need them. A non-finite or
/// non-positive `price_now` falls back to the last close; a non-finite snapshot yields
/// `Phase::DataInsufficient`.
pub fn classify(
    snapshot: &IndicatorSnapshot,
    mode: &ModeConfig,
    position: &Position,
    price_now: Option<f64>,
    levels: &LevelSet,
) -> Classification {
    let recover = levels
        .recovery
        .or_else(|| recovery_level(levels.buy_high, Some(snapshot.ma_mid)));

    let price = price_now
        .filter(|p| p.is_finite() && *p > 0.0)
        .unwrap_or(snapshot.close);
    if !snapshot.is_finite() || !price.is_finite() || price <= 0.0 {
        return Classification::new(
            Phase::DataInsufficient,
            "Current price or indicators unavailable; state cannot be judged.",
            None,
        );
    }

    if let Some(sl1) = levels.sl1 {
        let atr_buffer = 0.15 * (snapshot.atr / price);
        let buffer = mode.break_buffer_pct.max(atr_buffer);
        if price < sl1 * (1.0 - buffer) {
            return Classification::new(
                Phase::StructureBroken,
                format!(
                    "Prior buy/target levels are invalidated. {}, then recompute the scenario.",
                    recover_hint(recover, "reclaim")
                ),
                recover,
            );
        }
    }

    if position.is_holding() {
        classify_holder(price, position, levels, recover)
    } else {
        classify_new_entry(price, levels, recover)
    }
}

fn classify_new_entry(price: f64, levels: &LevelSet, recover: Option<f64>) -> Classification {
    let LevelSet {
        buy_low,
        buy_high,
        tp1,
        sl0,
        breakout,
        ..
    } = *levels;

    if let (Some(high), Some(br)) = (buy_high, breakout) {
        if price > high * 1.06 {
            if price < br.trigger * 0.997 {
                return Classification::new(
                    Phase::BreakoutWait,
                    format!(
                        "Price is far above the pullback band. Consider the breakout track: enter on a close above {:.2}.",
                        br.trigger
                    ),
                    recover,
                );
            }
            if price <= br.buy_high * 1.002 {
                return Classification::new(
                    Phase::BreakoutEntry,
                    format!(
                        "Trend resumption zone. (entry {:.2} ~ {:.2} / invalidation {:.2})",
                        br.buy_low, br.buy_high, br.sl0
                    ),
                    recover,
                );
            }
            return Classification::new(
                Phase::BreakoutChase,
                format!(
                    "Breakout already happened and price is extended. Wait for a retest near {:.2} instead of chasing.",
                    br.trigger
                ),
                recover,
            );
        }
    }

    if let Some(sl0) = sl0 {
        if price < sl0 * 0.998 {
            return Classification::new(
                Phase::FailSoft,
                format!(
                    "Entry thesis is shaken. Stand aside for now {}.",
                    recover_hint(recover, "re-evaluate")
                ),
                recover,
            );
        }
    }

    if let Some(low) = buy_low {
        if price <= low * 1.005 {
            let action = match sl0 {
                Some(sl0) => format!(
                    "Scale-in zone. (first tranche near {low:.2} / stop below {sl0:.2})"
                ),
                None => format!("Scale-in zone. (first tranche near {low:.2} / stop needs resetting)"),
            };
            return Classification::new(Phase::Entry1, action, recover);
        }
    }

    if let Some(high) = buy_high {
        if price <= high * 1.01 {
            let low = buy_low.unwrap_or(high);
            return Classification::new(
                Phase::WaitNear,
                format!("Not yet. Scale in as price approaches {low:.2} ~ {high:.2}."),
                recover,
            );
        }
    }

    if let Some(tp1) = tp1 {
        if price >= tp1 * 0.98 {
            let action = match buy_high {
                Some(high) => format!(
                    "Near resistance. Prefer confirmation over chasing. (on a pullback: revisit near {high:.2})"
                ),
                None => "Near resistance. Prefer confirmation over chasing.".to_string(),
            };
            return Classification::new(Phase::TpZone, action, recover);
        }
    }

    if let (Some(low), Some(high)) = (buy_low, buy_high) {
        return Classification::new(
            Phase::WaitFar,
            format!("Wait for the pullback band. (first tranche: {low:.2} ~ {high:.2})"),
            recover,
        );
    }

    Classification::new(Phase::Wait, "Wait (levels incomplete).", recover)
}

fn classify_holder(
    price: f64,
    position: &Position,
    levels: &LevelSet,
    recover: Option<f64>,
) -> Classification {
    let LevelSet {
        buy_low,
        buy_high,
        tp1,
        sl0,
        ..
    } = *levels;

    let pnl = position
        .unrealized_pct(price)
        .map(|pct| format!(" [vs avg: {pct:+.1}%]"))
        .unwrap_or_default();

    if let Some(sl0) = sl0 {
        if price < sl0 * 0.998 {
            return Classification::new(
                Phase::HoldDefSoft,
                format!(
                    "Defend first. (first defence line near {sl0:.2}) Keep if it recovers, reduce if it breaks again.{pnl}"
                ),
                recover,
            );
        }
    }

    if let Some(tp1) = tp1 {
        if price >= tp1 * 0.98 {
            return Classification::new(
                Phase::HoldTp,
                format!(
                    "Consider partial profit taking. (first target near {tp1:.2}) Avoid adding here.{pnl}"
                ),
                recover,
            );
        }
    }

    if let Some(low) = buy_low {
        if price >= low * 1.02 {
            let action = match (buy_high, sl0) {
                (Some(high), Some(sl0)) => format!(
                    "Hold. (pullback interest: {low:.2} ~ {high:.2} / defend below {sl0:.2}){pnl}"
                ),
                _ => format!("Hold (some levels missing).{pnl}"),
            };
            return Classification::new(Phase::HoldTrend, action, recover);
        }
    }

    if let (Some(low), Some(sl0)) = (buy_low, sl0) {
        return Classification::new(
            Phase::HoldAmb,
            format!(
                "Ambiguous zone. (add on pullbacks from {low:.2} / defend below {sl0:.2}){pnl}"
            ),
            recover,
        );
    }

    Classification::new(Phase::Hold, format!("Holding (levels incomplete).{pnl}"), recover)
}

#[cfg(test)]
mod tests {
    use super::{classify, Phase};
    use crate::services::indicators::IndicatorSnapshot;
    use crate::services::levels::{BreakoutLevels, LevelSet};
    use crate::value_objects::position::Position;
    use crate::value_objects::trading_mode::{ModeConfig, TradingMode};

    fn snapshot(close: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            timestamp: 0,
            close,
            ma_short: 99.0,
            ma_mid: 98.0,
            ma_long: 95.0,
            bb_upper: 106.0,
            bb_lower: 90.0,
            macd: 0.1,
            macd_signal: 0.05,
            stoch_k: 50.0,
            stoch_d: 50.0,
            rsi: 50.0,
            atr: 2.0,
        }
    }

    fn levels() -> LevelSet {
        LevelSet {
            buy_low: Some(96.04),
            buy_high: Some(98.98),
            tp0: Some(104.0),
            tp1: Some(106.0),
            tp2: Some(110.0),
            sl0: Some(93.16),
            sl1: Some(88.2),
            recovery: Some(99.47),
            breakout: Some(BreakoutLevels {
                trigger: 106.0,
                buy_low: 106.0,
                buy_high: 107.06,
                sl0: 103.5,
                tp1: 110.0,
            }),
        }
    }

    fn swing() -> ModeConfig {
        ModeConfig::for_mode(TradingMode::Swing)
    }

    fn new_entry_phase(price: f64) -> Phase {
        classify(
            &snapshot(price),
            &swing(),
            &Position::new_entry(),
            None,
            &levels(),
        )
        .phase
    }

    fn holder_phase(price: f64) -> Phase {
        classify(
            &snapshot(price),
            &swing(),
            &Position::holding(Some(95.0), Some(10.0)),
            None,
            &levels(),
        )
        .phase
    }

    #[test]
    fn new_entry_ladder() {
        assert_eq!(new_entry_phase(80.0), Phase::StructureBroken);
        assert_eq!(new_entry_phase(90.0), Phase::FailSoft);
        assert_eq!(new_entry_phase(96.0), Phase::Entry1);
        assert_eq!(new_entry_phase(99.5), Phase::WaitNear);
        assert_eq!(new_entry_phase(102.0), Phase::WaitFar);
        assert_eq!(new_entry_phase(104.0), Phase::TpZone);
    }

    #[test]
    fn new_entry_breakout_track() {
        assert_eq!(new_entry_phase(105.0), Phase::BreakoutWait);
        assert_eq!(new_entry_phase(106.5), Phase::BreakoutEntry);
        assert_eq!(new_entry_phase(110.0), Phase::BreakoutChase);
    }

    #[test]
    fn holder_ladder() {
        assert_eq!(holder_phase(80.0), Phase::StructureBroken);
        assert_eq!(holder_phase(90.0), Phase::HoldDefSoft);
        assert_eq!(holder_phase(105.0), Phase::HoldTp);
        assert_eq!(holder_phase(99.0), Phase::HoldTrend);
        assert_eq!(holder_phase(96.0), Phase::HoldAmb);
    }

    #[test]
    fn holder_action_mentions_unrealized_pct() {
        let out = classify(
            &snapshot(99.0),
            &swing(),
            &Position::holding(Some(90.0), None),
            None,
            &levels(),
        );
        assert!(out.action.contains("+10.0%"), "{}", out.action);
    }

    #[test]
    fn missing_levels_fall_through() {
        let out = classify(
            &snapshot(100.0),
            &swing(),
            &Position::new_entry(),
            None,
            &LevelSet::default(),
        );
        assert_eq!(out.phase, Phase::Wait);
        let out = classify(
            &snapshot(100.0),
            &swing(),
            &Position::holding(None, None),
            None,
            &LevelSet::default(),
        );
        assert_eq!(out.phase, Phase::Hold);
    }

    #[test]
    fn nan_snapshot_is_data_insufficient() {
        let mut snap = snapshot(100.0);
        snap.rsi = f64::NAN;
        let out = classify(&snap, &swing(), &Position::new_entry(), None, &levels());
        assert_eq!(out.phase, Phase::DataInsufficient);
        assert_eq!(out.phase_tag(), "data_insufficient");
    }

    #[test]
    fn price_override_takes_precedence() {
        let out = classify(
            &snapshot(100.0),
            &swing(),
            &Position::new_entry(),
            Some(80.0),
            &levels(),
        );
        assert_eq!(out.phase, Phase::StructureBroken);
        assert!(out.recover_level.is_some());
    }

    #[test]
    fn invalid_price_override_falls_back_to_close() {
        let baseline = classify(
            &snapshot(100.0),
            &swing(),
            &Position::new_entry(),
            None,
            &levels(),
        );
        for bad in [f64::NAN, f64::INFINITY, 0.0, -5.0] {
            let out = classify(
                &snapshot(100.0),
                &swing(),
                &Position::new_entry(),
                Some(bad),
                &levels(),
            );
            assert_eq!(out.phase, baseline.phase, "override {bad}");
            assert_ne!(out.phase, Phase::DataInsufficient);
        }
    }

    #[test]
    fn atr_widens_the_break_buffer() {
        let mut snap = snapshot(87.5);
        // 0.35% buffer would break at 87.89; 0.15 * 10 / 87.5 = 1.7% pushes it to ~86.7.
        snap.atr = 10.0;
        let out = classify(&snap, &swing(), &Position::new_entry(), None, &levels());
        assert_ne!(out.phase, Phase::StructureBroken);
    }
}
