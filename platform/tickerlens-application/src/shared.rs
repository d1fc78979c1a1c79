use crate::config::{Config, ModeOverride};
use std::collections::{BTreeMap, BTreeSet};
use tickerlens_domain::value_objects::period::HistoryPeriod;
use tickerlens_domain::value_objects::trading_mode::{ModeConfig, TradingMode};

const POPULAR_SYMBOLS: [&str; 20] = [
    "NVDA", "META", "TSLA", "AAPL", "MSFT", "AMZN", "QQQ", "TQQQ", "SOXL", "SPY", "VOO", "COIN",
    "MSTR", "RIOT", "MARA", "ORCL", "PYPL", "NFLX", "PLTR", "AVGO",
];

pub(crate) const BIGTECH: [&str; 7] = ["NVDA", "AAPL", "MSFT", "AMZN", "META", "GOOGL", "TSLA"];

/// Resolves a trading mode by name (falling back to `[run].mode`) and applies `[modes.<name>]`.
pub fn resolve_mode(config: &Config, name: Option<&str>) -> Result<ModeConfig, String> {
    let mode = TradingMode::parse(name.unwrap_or(&config.run.mode))?;
    let mut resolved = ModeConfig::for_mode(mode);

    for (key, overrides) in &config.modes {
        let key_mode = TradingMode::parse(key).map_err(|err| format!("[modes.{key}]: {err}"))?;
        if key_mode == mode {
            apply_override(&mut resolved, overrides);
        }
    }

    HistoryPeriod::parse(&resolved.period)
        .map_err(|err| format!("[modes.{}].period: {err}", mode.as_str()))?;
    resolved.validate()?;
    Ok(resolved)
}

fn apply_override(cfg: &mut ModeConfig, o: &ModeOverride) {
    if let Some(period) = &o.period {
        cfg.period = period.trim().to_lowercase();
    }
    if let Some(value) = o.lookback_short {
        cfg.lookback_short = value;
    }
    if let Some(value) = o.lookback_long {
        cfg.lookback_long = value;
    }
    let floats = [
        (o.atr_mult, &mut cfg.atr_mult),
        (o.target_pct, &mut cfg.target_pct),
        (o.stop_pct, &mut cfg.stop_pct),
        (o.entry_stop_pct, &mut cfg.entry_stop_pct),
        (o.break_buffer_pct, &mut cfg.break_buffer_pct),
        (o.breakout_floor_pct, &mut cfg.breakout_floor_pct),
        (o.breakout_atr_mult, &mut cfg.breakout_atr_mult),
        (o.breakout_rr_mult, &mut cfg.breakout_rr_mult),
    ];
    for (value, slot) in floats {
        if let Some(value) = value {
            *slot = value;
        }
    }
}

/// Maps a user-typed name to a ticker: alias table first, otherwise spaces are dropped and
/// the result is upper-cased.
pub fn normalize_symbol(input: &str, aliases: &BTreeMap<String, String>) -> String {
    let name = input.trim();
    if let Some(symbol) = aliases.get(name) {
        return symbol.clone();
    }
    let lowered = name.to_lowercase();
    if let Some(symbol) = aliases
        .iter()
        .find(|(alias, _)| alias.to_lowercase() == lowered)
        .map(|(_, symbol)| symbol)
    {
        return symbol.clone();
    }
    name.replace(' ', "").to_uppercase()
}

pub(crate) fn scan_candidates(config: &Config) -> Vec<String> {
    let aliases = config.aliases();
    match config.scan.as_ref().and_then(|s| s.candidates.as_ref()) {
        Some(list) => list.iter().map(|s| normalize_symbol(s, &aliases)).collect(),
        None => POPULAR_SYMBOLS
            .iter()
            .chain(BIGTECH.iter())
            .map(|s| s.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    }
}

pub(crate) fn bigtech_symbols(config: &Config) -> Vec<String> {
    match config.scan.as_ref().and_then(|s| s.bigtech.as_ref()) {
        Some(list) => list.clone(),
        None => BIGTECH.iter().map(|s| s.to_string()).collect(),
    }
}
