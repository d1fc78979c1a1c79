use crate::services::indicators::IndicatorSnapshot;
use crate::value_objects::bar::PriceBar;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasDirection {
    Up,
    Neutral,
    Down,
}

impl BiasDirection {
    pub fn describe(&self) -> &'static str {
        match self {
            BiasDirection::Up => "short-term upside bias (buying pressure over the next few days)",
            BiasDirection::Neutral => "short-term neutral to mixed (no clear direction)",
            BiasDirection::Down => "short-term downside bias (pullback pressure is high)",
        }
    }

    /// Points the scanner awards for this bias.
    pub fn scan_points(&self) -> f64 {
        match self {
            BiasDirection::Up => 2.0,
            BiasDirection::Neutral => 1.0,
            BiasDirection::Down => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bias {
    pub score: i32,
    pub direction: BiasDirection,
}

pub fn short_term_bias(snapshot: &IndicatorSnapshot) -> Bias {
    let s = snapshot;
    let vote = |cond: bool| if cond { 1 } else { -1 };

    let mut score = vote(s.close > s.ma_mid) + vote(s.close > s.ma_short) + vote(s.macd > s.macd_signal);

    if s.rsi > 60.0 {
        score += 1;
    } else if s.rsi < 40.0 {
        score -= 1;
    }

    if s.stoch_k > s.stoch_d && s.stoch_k > 50.0 {
        score += 1;
    } else if s.stoch_k < s.stoch_d && s.stoch_k < 50.0 {
        score -= 1;
    }

    let direction = if score >= 3 {
        BiasDirection::Up
    } else if score <= -3 {
        BiasDirection::Down
    } else {
        BiasDirection::Neutral
    };
    Bias { score, direction }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    StrongUp,
    MildUp,
    Flat,
    MildDown,
    StrongDown,
}

impl GapKind {
    pub fn describe(&self) -> &'static str {
        match self {
            GapKind::StrongUp => "strong gap up (watch for a gap fill)",
            GapKind::MildUp => "mild gap up",
            GapKind::Flat => "no meaningful gap",
            GapKind::MildDown => "mild gap down",
            GapKind::StrongDown => "strong gap down (possible panic selling)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GapInfo {
    pub pct: f64,
    pub kind: GapKind,
}

/// Opening gap of the last bar against the previous close, in percent.
pub fn gap_info(bars: &[PriceBar]) -> Option<GapInfo> {
    let [.., prev, last] = bars else {
        return None;
    };
    if !prev.close.is_finite() || prev.close <= 0.0 || !last.open.is_finite() {
        return None;
    }
    let pct = (last.open - prev.close) / prev.close * 100.0;
    let kind = if pct > 1.5 {
        GapKind::StrongUp
    } else if pct > 0.3 {
        GapKind::MildUp
    } else if pct < -1.5 {
        GapKind::StrongDown
    } else if pct < -0.3 {
        GapKind::MildDown
    } else {
        GapKind::Flat
    };
    Some(GapInfo { pct, kind })
}

/// Reward over risk, only when the target is above and the stop below `price`.
pub fn reward_risk(price: f64, tp: Option<f64>, sl: Option<f64>) -> Option<f64> {
    let (tp, sl) = (tp?, sl?);
    if !price.is_finite() || tp <= price || sl >= price {
        return None;
    }
    let ratio = (tp - price) / (price - sl);
    ratio.is_finite().then_some(ratio)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskAlert {
    RiskOff { market_score: i32 },
    Overbought { rsi: f64 },
    Oversold { rsi: f64 },
    LargeGap { gap_pct: f64 },
    WideRange { atr_ratio: f64 },
    AllClear,
}

impl RiskAlert {
    pub fn message(&self) -> String {
        match self {
            RiskAlert::RiskOff { .. } => {
                "market is in strong risk-off (index/rates/dollar mix points to fear)".to_string()
            }
            RiskAlert::Overbought { rsi } => {
                format!("RSI {rsi:.1} is 75 or above: short-term overheated, sharp drops possible")
            }
            RiskAlert::Oversold { rsi } => {
                format!("RSI {rsi:.1} is 25 or below: oversold but the downtrend may continue")
            }
            RiskAlert::LargeGap { gap_pct } => format!(
                "{gap_pct:.2}% gap vs previous close: both gap fill and extension possible"
            ),
            RiskAlert::WideRange { atr_ratio } => {
                format!("today's move is {atr_ratio:.1}x ATR: unusually volatile session")
            }
            RiskAlert::AllClear => "no specific risk warnings".to_string(),
        }
    }
}

pub fn risk_alerts(
    market_score: i32,
    snapshot: &IndicatorSnapshot,
    gap_pct: Option<f64>,
    atr: Option<f64>,
    price_move_abs: Option<f64>,
) -> Vec<RiskAlert> {
    let mut alerts = Vec::new();
    if market_score <= -4 {
        alerts.push(RiskAlert::RiskOff { market_score });
    }

    let rsi = snapshot.rsi;
    if rsi >= 75.0 {
        alerts.push(RiskAlert::Overbought { rsi });
    } else if rsi <= 25.0 {
        alerts.push(RiskAlert::Oversold { rsi });
    }

    if let Some(gap_pct) = gap_pct.filter(|g| g.abs() >= 2.0) {
        alerts.push(RiskAlert::LargeGap { gap_pct });
    }

    if let (Some(atr), Some(moved)) = (atr.filter(|a| *a > 0.0), price_move_abs) {
        let atr_ratio = moved / atr;
        if atr_ratio >= 1.5 {
            alerts.push(RiskAlert::WideRange { atr_ratio });
        }
    }

    if alerts.is_empty() {
        alerts.push(RiskAlert::AllClear);
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::{gap_info, reward_risk, risk_alerts, short_term_bias, BiasDirection, GapKind, RiskAlert};
    use crate::services::indicators::IndicatorSnapshot;
    use crate::value_objects::bar::PriceBar;

    fn snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            timestamp: 0,
            close: 100.0,
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

    fn bar(open: f64, close: f64) -> PriceBar {
        PriceBar {
            symbol: "NVDA".to_string(),
            timestamp: 0,
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn bias_counts_votes() {
        let bias = short_term_bias(&snapshot());
        assert_eq!(bias.score, 3);
        assert_eq!(bias.direction, BiasDirection::Up);

        let mut weak = snapshot();
        weak.close = 90.0;
        weak.macd = -0.2;
        weak.rsi = 35.0;
        weak.stoch_k = 20.0;
        weak.stoch_d = 30.0;
        let bias = short_term_bias(&weak);
        assert_eq!(bias.score, -5);
        assert_eq!(bias.direction, BiasDirection::Down);
    }

    #[test]
    fn gap_thresholds() {
        let gap = gap_info(&[bar(100.0, 100.0), bar(102.0, 101.0)]).expect("gap");
        assert_eq!(gap.kind, GapKind::StrongUp);
        let gap = gap_info(&[bar(100.0, 100.0), bar(99.5, 99.0)]).expect("gap");
        assert_eq!(gap.kind, GapKind::MildDown);
        let gap = gap_info(&[bar(100.0, 100.0), bar(100.1, 101.0)]).expect("gap");
        assert_eq!(gap.kind, GapKind::Flat);
        assert!(gap_info(&[bar(1.0, 1.0)]).is_none());
    }

    #[test]
    fn reward_risk_requires_bracketing_levels() {
        let rr = reward_risk(100.0, Some(110.0), Some(95.0)).expect("rr");
        assert!((rr - 2.0).abs() < 1e-12);
        assert_eq!(reward_risk(100.0, Some(99.0), Some(95.0)), None);
        assert_eq!(reward_risk(100.0, Some(110.0), Some(101.0)), None);
        assert_eq!(reward_risk(100.0, None, Some(95.0)), None);
    }

    #[test]
    fn alerts_stack_and_fall_back_to_all_clear() {
        assert_eq!(
            risk_alerts(0, &snapshot(), Some(0.5), Some(2.0), Some(1.0)),
            vec![RiskAlert::AllClear]
        );

        let mut hot = snapshot();
        hot.rsi = 80.0;
        let alerts = risk_alerts(-5, &hot, Some(-2.5), Some(2.0), Some(4.0));
        assert_eq!(alerts.len(), 4);
        assert!(matches!(alerts[0], RiskAlert::RiskOff { market_score: -5 }));
        assert!(matches!(alerts[1], RiskAlert::Overbought { .. }));
        assert!(alerts[3].message().contains("2.0x"));
    }
}
