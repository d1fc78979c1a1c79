use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TradingMode {
    Day,
    Swing,
    LongTerm,
}

impl TradingMode {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "swing" => Ok(Self::Swing),
            "long-term" | "long_term" | "long" => Ok(Self::LongTerm),
            _ => Err(format!(
                "unsupported trading mode: {value} (expected day | swing | long-term)"
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Swing => "swing",
            Self::LongTerm => "long-term",
        }
    }
}

/// Static per-mode knobs for lookbacks, target/stop percentages and the breakout track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeConfig {
    pub mode: TradingMode,
    pub period: String,
    pub lookback_short: usize,
    pub lookback_long: usize,
    pub atr_mult: f64,
    pub target_pct: f64,
    pub stop_pct: f64,
    pub entry_stop_pct: f64,
    pub break_buffer_pct: f64,
    pub breakout_floor_pct: f64,
    pub breakout_atr_mult: f64,
    pub breakout_rr_mult: f64,
}

impl ModeConfig {
    pub fn for_mode(mode: TradingMode) -> Self {
        match mode {
            TradingMode::Day => Self {
                mode,
                period: "3mo".to_string(),
                lookback_short: 10,
                lookback_long: 20,
                atr_mult: 1.0,
                target_pct: 0.05,
                stop_pct: 0.04,
                entry_stop_pct: 0.03,
                break_buffer_pct: 0.002,
                breakout_floor_pct: 0.010,
                breakout_atr_mult: 0.9,
                breakout_rr_mult: 1.2,
            },
            TradingMode::Swing => Self {
                mode,
                period: "6mo".to_string(),
                lookback_short: 15,
                lookback_long: 40,
                atr_mult: 1.3,
                target_pct: 0.08,
                stop_pct: 0.07,
                entry_stop_pct: 0.03,
                break_buffer_pct: 0.0035,
                breakout_floor_pct: 0.012,
                breakout_atr_mult: 1.1,
                breakout_rr_mult: 1.5,
            },
            TradingMode::LongTerm => Self {
                mode,
                period: "1y".to_string(),
                lookback_short: 20,
                lookback_long: 60,
                atr_mult: 1.6,
                target_pct: 0.15,
                stop_pct: 0.12,
                entry_stop_pct: 0.03,
                break_buffer_pct: 0.0035,
                breakout_floor_pct: 0.015,
                breakout_atr_mult: 1.4,
                breakout_rr_mult: 1.8,
            },
        }
    }

    pub fn by_name(name: &str) -> Result<Self, String> {
        TradingMode::parse(name).map(Self::for_mode)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.lookback_short == 0 || self.lookback_long == 0 {
            return Err(format!("{}: lookbacks must be > 0", self.mode.as_str()));
        }
        let pcts = [
            ("target_pct", self.target_pct),
            ("stop_pct", self.stop_pct),
            ("entry_stop_pct", self.entry_stop_pct),
            ("break_buffer_pct", self.break_buffer_pct),
            ("breakout_floor_pct", self.breakout_floor_pct),
        ];
        for (name, value) in pcts {
            if !value.is_finite() || value <= 0.0 || value >= 1.0 {
                return Err(format!(
                    "{}: {name} must be in (0, 1), got {value}",
                    self.mode.as_str()
                ));
            }
        }
        let mults = [
            ("atr_mult", self.atr_mult),
            ("breakout_atr_mult", self.breakout_atr_mult),
            ("breakout_rr_mult", self.breakout_rr_mult),
        ];
        for (name, value) in mults {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!(
                    "{}: {name} must be finite and > 0, got {value}",
                    self.mode.as_str()
                ));
            }
        }
        Ok(())
    }
}
