use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tickerlens_domain::services::indicators::IndicatorConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub run: RunConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub indicators: IndicatorConfig,
    #[serde(default)]
    pub modes: BTreeMap<String, ModeOverride>,
    pub scan: Option<ScanConfig>,
    pub symbols: Option<SymbolsConfig>,
    pub cache: Option<CacheConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub mode: String,
    #[serde(default)]
    pub symbols: Vec<String>,
    pub intraday: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    pub data_dir: String,
    pub macro_path: Option<String>,
    pub out_dir: Option<String>,
}

/// Per-mode overrides layered on top of the built-in `ModeConfig` table.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ModeOverride {
    pub period: Option<String>,
    pub lookback_short: Option<usize>,
    pub lookback_long: Option<usize>,
    pub atr_mult: Option<f64>,
    pub target_pct: Option<f64>,
    pub stop_pct: Option<f64>,
    pub entry_stop_pct: Option<f64>,
    pub break_buffer_pct: Option<f64>,
    pub breakout_floor_pct: Option<f64>,
    pub breakout_atr_mult: Option<f64>,
    pub breakout_rr_mult: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    pub candidates: Option<Vec<String>>,
    pub max_results: Option<usize>,
    pub max_rsi: Option<f64>,
    pub bigtech: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct SymbolsConfig {
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    pub capacity: Option<usize>,
    pub recent: Option<usize>,
}

impl Config {
    pub fn aliases(&self) -> BTreeMap<String, String> {
        self.symbols
            .as_ref()
            .map(|s| s.aliases.clone())
            .unwrap_or_default()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.as_ref().and_then(|c| c.capacity).unwrap_or(32)
    }

    pub fn recent_capacity(&self) -> usize {
        self.cache.as_ref().and_then(|c| c.recent).unwrap_or(10)
    }

    pub fn intraday_enabled(&self) -> bool {
        self.run.intraday.unwrap_or(false)
    }
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    parse_config(&contents).map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))
}

pub fn parse_config(contents: &str) -> Result<Config, String> {
    let config: Config = toml::from_str(contents).map_err(|err| err.to_string())?;
    config.indicators.validate()?;
    Ok(config)
}
