use crate::value_objects::bar::PriceBar;
use serde::{Deserialize, Serialize};

mod rolling;

pub use rolling::{Ema, Extreme, RollingAtr, RollingExtreme, RollingSma, RollingStd, WilderRsi};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorConfig {
    pub ma_short: usize,
    pub ma_mid: usize,
    pub ma_long: usize,
    pub bb_window: usize,
    pub bb_k: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub stoch_window: usize,
    pub stoch_smooth: usize,
    pub rsi_window: usize,
    pub atr_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ma_short: 5,
            ma_mid: 20,
            ma_long: 50,
            bb_window: 20,
            bb_k: 2.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            stoch_window: 14,
            stoch_smooth: 3,
            rsi_window: 14,
            atr_window: 14,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        let windows = [
            ("ma_short", self.ma_short),
            ("ma_mid", self.ma_mid),
            ("ma_long", self.ma_long),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("stoch_window", self.stoch_window),
            ("stoch_smooth", self.stoch_smooth),
            ("rsi_window", self.rsi_window),
            ("atr_window", self.atr_window),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(format!("indicators.{name} must be > 0"));
            }
        }
        if self.bb_window < 2 {
            return Err("indicators.bb_window must be >= 2".to_string());
        }
        if !self.bb_k.is_finite() || self.bb_k <= 0.0 {
            return Err("indicators.bb_k must be finite and > 0".to_string());
        }
        if self.macd_fast >= self.macd_slow {
            return Err("indicators.macd_fast must be < macd_slow".to_string());
        }
        Ok(())
    }

    /// Smallest number of bars that yields at least one complete row.
    pub fn min_bars(&self) -> usize {
        [
            self.ma_short,
            self.ma_mid,
            self.ma_long,
            self.bb_window,
            self.stoch_window + self.stoch_smooth - 1,
            self.rsi_window + 1,
            self.atr_window,
        ]
        .into_iter()
        .max()
        .unwrap_or(1)
    }

    pub fn warmup_bars(&self) -> usize {
        self.min_bars().saturating_sub(1)
    }
}

/// Indicator values for a single bar. Moving averages follow `IndicatorConfig`
/// (5/20/50 by default).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub timestamp: i64,
    pub close: f64,
    pub ma_short: f64,
    pub ma_mid: f64,
    pub ma_long: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub rsi: f64,
    pub atr: f64,
}

impl IndicatorSnapshot {
    pub fn is_finite(&self) -> bool {
        [
            self.close,
            self.ma_short,
            self.ma_mid,
            self.ma_long,
            self.bb_upper,
            self.bb_lower,
            self.macd,
            self.macd_signal,
            self.stoch_k,
            self.stoch_d,
            self.rsi,
            self.atr,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub bar: PriceBar,
    pub snapshot: IndicatorSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorFrame {
    rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    pub fn from_rows(rows: Vec<IndicatorRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    pub fn snapshot(&self) -> Option<IndicatorSnapshot> {
        self.rows.last().map(|row| row.snapshot)
    }

    pub fn recent(&self, n: usize) -> &[IndicatorRow] {
        let start = self.rows.len().saturating_sub(n.max(1));
        &self.rows[start..]
    }

    pub fn recent_high(&self, n: usize) -> Option<f64> {
        self.recent(n)
            .iter()
            .map(|row| row.bar.high)
            .reduce(f64::max)
    }

    pub fn recent_low(&self, n: usize) -> Option<f64> {
        self.recent(n).iter().map(|row| row.bar.low).reduce(f64::min)
    }
}

struct IndicatorState {
    ma_short: RollingSma,
    ma_mid: RollingSma,
    ma_long: RollingSma,
    bb_mean: RollingSma,
    bb_std: RollingStd,
    bb_k: f64,
    ema_fast: Ema,
    ema_slow: Ema,
    macd_signal: Ema,
    stoch_low: RollingExtreme,
    stoch_high: RollingExtreme,
    stoch_d: RollingSma,
    rsi: WilderRsi,
    atr: RollingAtr,
}

impl IndicatorState {
    fn new(config: &IndicatorConfig) -> Self {
        Self {
            ma_short: RollingSma::new(config.ma_short),
            ma_mid: RollingSma::new(config.ma_mid),
            ma_long: RollingSma::new(config.ma_long),
            bb_mean: RollingSma::new(config.bb_window),
            bb_std: RollingStd::new(config.bb_window),
            bb_k: config.bb_k,
            ema_fast: Ema::with_span(config.macd_fast),
            ema_slow: Ema::with_span(config.macd_slow),
            macd_signal: Ema::with_span(config.macd_signal),
            stoch_low: RollingExtreme::new(config.stoch_window, Extreme::Min),
            stoch_high: RollingExtreme::new(config.stoch_window, Extreme::Max),
            stoch_d: RollingSma::new(config.stoch_smooth),
            rsi: WilderRsi::new(config.rsi_window),
            atr: RollingAtr::new(config.atr_window),
        }
    }

    fn update(&mut self, bar: &PriceBar) -> Option<IndicatorSnapshot> {
        let close = bar.close;

        let ma_short = self.ma_short.update(close);
        let ma_mid = self.ma_mid.update(close);
        let ma_long = self.ma_long.update(close);

        let bb_mean = self.bb_mean.update(close);
        let bb_std = self.bb_std.update(close);

        let macd = match (self.ema_fast.update(close), self.ema_slow.update(close)) {
            (Some(fast), Some(slow)) => Some(fast - slow),
            _ => None,
        };
        let macd_signal = macd.and_then(|m| self.macd_signal.update(m));

        let low = self.stoch_low.update(bar.low);
        let high = self.stoch_high.update(bar.high);
        let stoch_k = match (low, high) {
            (Some(low), Some(high)) => Some(stochastic_k(close, low, high)),
            _ => None,
        };
        let stoch_d = stoch_k.and_then(|k| self.stoch_d.update(k));

        let rsi = self.rsi.update(close);
        let atr = self.atr.update(bar.high, bar.low, close);

        let (mean, std) = (bb_mean?, bb_std?);
        let snapshot = IndicatorSnapshot {
            timestamp: bar.timestamp,
            close,
            ma_short: ma_short?,
            ma_mid: ma_mid?,
            ma_long: ma_long?,
            bb_upper: mean + self.bb_k * std,
            bb_lower: mean - self.bb_k * std,
            macd: macd?,
            macd_signal: macd_signal?,
            stoch_k: stoch_k?,
            stoch_d: stoch_d?,
            rsi: rsi?,
            atr: atr?,
        };
        snapshot.is_finite().then_some(snapshot)
    }
}

/// %K with a flat-range guard: when the window high equals the low the close sits mid-range.
pub fn stochastic_k(close: f64, low: f64, high: f64) -> f64 {
    let range = high - low;
    if !range.is_finite() || range <= 0.0 {
        return 50.0;
    }
    ((close - low) / range * 100.0).clamp(0.0, 100.0)
}

/// Builds the indicator frame for an ordered bar series.
///
/// Bars with non-finite prices or a non-positive close are skipped. Rows without full
/// window history are dropped, so input shorter than `config.min_bars()` gives an empty frame.
pub fn build_indicators(bars: &[PriceBar], config: &IndicatorConfig) -> IndicatorFrame {
    if bars.len() < config.min_bars() {
        return IndicatorFrame::default();
    }

    let mut state = IndicatorState::new(config);
    let rows = bars
        .iter()
        .filter(|bar| bar.is_finite() && bar.close > 0.0)
        .filter_map(|bar| {
            state.update(bar).map(|snapshot| IndicatorRow {
                bar: bar.clone(),
                snapshot,
            })
        })
        .collect();

    IndicatorFrame { rows }
}

#[cfg(test)]
mod tests {
    use super::{build_indicators, stochastic_k, IndicatorConfig};
    use crate::value_objects::bar::PriceBar;

    fn bar(ts: i64, close: f64) -> PriceBar {
        PriceBar {
            symbol: "NVDA".to_string(),
            timestamp: ts,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
        }
    }

    fn series(n: usize) -> Vec<PriceBar> {
        (0..n)
            .map(|i| bar(i as i64 * 86_400, 100.0 + (i as f64 * 0.7).sin() * 5.0))
            .collect()
    }

    #[test]
    fn empty_input_gives_empty_frame() {
        let frame = build_indicators(&[], &IndicatorConfig::default());
        assert!(frame.is_empty());
        assert!(frame.snapshot().is_none());
    }

    #[test]
    fn short_input_gives_empty_frame() {
        let config = IndicatorConfig::default();
        let frame = build_indicators(&series(config.min_bars() - 1), &config);
        assert!(frame.is_empty());
    }

    #[test]
    fn warmup_rows_are_dropped() {
        let config = IndicatorConfig::default();
        assert_eq!(config.min_bars(), 50);
        let frame = build_indicators(&series(60), &config);
        assert_eq!(frame.len(), 60 - config.warmup_bars());
        let first = &frame.rows()[0];
        assert_eq!(first.bar.timestamp, config.warmup_bars() as i64 * 86_400);
    }

    #[test]
    fn moving_average_matches_manual_mean() {
        let config = IndicatorConfig::default();
        let bars = series(55);
        let frame = build_indicators(&bars, &config);
        let snap = frame.snapshot().expect("snapshot");
        let tail = &bars[bars.len() - 20..];
        let mean = tail.iter().map(|b| b.close).sum::<f64>() / 20.0;
        assert!((snap.ma_mid - mean).abs() < 1e-9);
        assert!(snap.bb_lower <= snap.ma_mid && snap.ma_mid <= snap.bb_upper);
    }

    #[test]
    fn atr_of_constant_range_series() {
        let config = IndicatorConfig::default();
        let bars: Vec<PriceBar> = (0..60).map(|i| bar(i, 100.0)).collect();
        let frame = build_indicators(&bars, &config);
        let snap = frame.snapshot().expect("snapshot");
        assert!((snap.atr - 2.0).abs() < 1e-12);
        assert!((snap.rsi - 50.0).abs() < 1e-12);
        assert!((snap.bb_upper - snap.bb_lower).abs() < 1e-9);
    }

    #[test]
    fn flat_range_stochastic_is_guarded() {
        assert_eq!(stochastic_k(10.0, 10.0, 10.0), 50.0);
        assert_eq!(stochastic_k(12.0, 10.0, 12.0), 100.0);
        assert_eq!(stochastic_k(10.0, 10.0, 12.0), 0.0);
    }

    #[test]
    fn non_finite_bars_are_skipped() {
        let config = IndicatorConfig::default();
        let mut bars = series(70);
        bars[60].close = f64::NAN;
        bars[61].high = f64::INFINITY;
        let frame = build_indicators(&bars, &config);
        assert!(!frame.is_empty());
        assert!(frame.rows().iter().all(|r| r.snapshot.is_finite()));
        assert!(frame.rows().iter().all(|r| r.bar.timestamp != bars[60].timestamp));
    }

    #[test]
    fn recent_extremes() {
        let config = IndicatorConfig::default();
        let frame = build_indicators(&series(80), &config);
        let high = frame.recent_high(5).expect("high");
        let low = frame.recent_low(5).expect("low");
        assert!(high >= low);
        let last5 = frame.recent(5);
        assert_eq!(last5.len(), 5);
        assert!(last5.iter().all(|r| r.bar.high <= high));
    }

    #[test]
    fn config_validation() {
        assert!(IndicatorConfig::default().validate().is_ok());
        let bad = IndicatorConfig {
            macd_fast: 30,
            ..IndicatorConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
