use crate::analysis::{load_market_score, AnalysisDeps};
use crate::config::Config;
use crate::shared::scan_candidates;
use serde::Serialize;
use std::time::Instant;
use tickerlens_domain::repositories::market_data::BarQuery;
use tickerlens_domain::services::indicators::build_indicators;
use tickerlens_domain::services::levels::compute_levels;
use tickerlens_domain::services::macro_score::MarketScore;
use tickerlens_domain::services::ohlcv::sanitize_bars;
use tickerlens_domain::services::signals::{reward_risk, short_term_bias, BiasDirection};
use tickerlens_domain::value_objects::period::HistoryPeriod;
use tickerlens_domain::value_objects::position::Position;
use tickerlens_domain::value_objects::trading_mode::ModeConfig;
use tracing::{debug, info, info_span};

const DEFAULT_MAX_RESULTS: usize = 8;
const DEFAULT_MAX_RSI: f64 = 65.0;
const MIN_SCAN_ROWS: usize = 30;

#[derive(Debug, Clone, Serialize)]
pub struct ScanCandidate {
    pub symbol: String,
    pub price: f64,
    pub rsi: f64,
    pub bias: BiasDirection,
    /// Distance from the entry band centre, in percent of price.
    pub band_distance_pct: f64,
    pub buy_low: f64,
    pub buy_high: f64,
    pub tp1: f64,
    pub sl0: f64,
    pub reward_risk: Option<f64>,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub market_score: MarketScore,
    pub candidates: Vec<ScanCandidate>,
    pub skipped: Vec<SkippedSymbol>,
}

enum Screened {
    Candidate(ScanCandidate),
    Filtered,
    Skipped(String),
}

/// Screens the candidate list for new entries sitting near their pullback band with a
/// moderate RSI, ranked by bias, band distance and RSI balance.
pub fn scan(
    config: &Config,
    mode: &ModeConfig,
    deps: &AnalysisDeps<'_>,
) -> Result<ScanReport, String> {
    let candidates = scan_candidates(config);
    let _span = info_span!(
        "scan",
        mode = mode.mode.as_str(),
        candidates = candidates.len()
    )
    .entered();

    let period = HistoryPeriod::parse(&mode.period)?;
    let max_results = config
        .scan
        .as_ref()
        .and_then(|s| s.max_results)
        .unwrap_or(DEFAULT_MAX_RESULTS);
    let max_rsi = config
        .scan
        .as_ref()
        .and_then(|s| s.max_rsi)
        .unwrap_or(DEFAULT_MAX_RSI);

    let stage_start = Instant::now();
    let market_score = load_market_score(deps.macro_data);

    let mut found = Vec::new();
    let mut skipped = Vec::new();
    for symbol in candidates {
        match screen(&symbol, mode, &period, max_rsi, deps) {
            Screened::Candidate(candidate) => found.push(candidate),
            Screened::Filtered => debug!(symbol = %symbol, "filtered out"),
            Screened::Skipped(reason) => {
                metrics::counter!("tickerlens.scan.skipped").increment(1);
                skipped.push(SkippedSymbol { symbol, reason });
            }
        }
    }

    found.sort_by(|a, b| b.score.total_cmp(&a.score));
    found.truncate(max_results);

    metrics::histogram!("tickerlens.scan.duration_ms")
        .record(stage_start.elapsed().as_millis() as f64);
    metrics::gauge!("tickerlens.scan.candidates").set(found.len() as f64);
    info!(
        found = found.len(),
        skipped = skipped.len(),
        market_score = market_score.score,
        "scan finished"
    );

    Ok(ScanReport {
        market_score,
        candidates: found,
        skipped,
    })
}

fn screen(
    symbol: &str,
    mode: &ModeConfig,
    period: &HistoryPeriod,
    max_rsi: f64,
    deps: &AnalysisDeps<'_>,
) -> Screened {
    let bars = match deps
        .market_data
        .load_bars(&BarQuery::daily(symbol, period.clone()))
    {
        Ok((bars, _)) => sanitize_bars(bars),
        Err(err) => return Screened::Skipped(err.to_string()),
    };

    let frame = build_indicators(&bars, deps.indicators);
    let required = MIN_SCAN_ROWS.max(mode.lookback_long + 5);
    if frame.len() < required {
        return Screened::Skipped(format!(
            "insufficient history: {} rows, need {required}",
            frame.len()
        ));
    }

    let Some(snapshot) = frame.snapshot() else {
        return Screened::Skipped("no indicator rows".to_string());
    };
    let Some(levels) = compute_levels(&frame, mode, &Position::new_entry(), None) else {
        return Screened::Skipped("levels unavailable".to_string());
    };
    let (Some(buy_low), Some(buy_high), Some(tp1)) = (levels.buy_low, levels.buy_high, levels.tp1)
    else {
        return Screened::Skipped("levels incomplete".to_string());
    };

    let price = snapshot.close;
    let rsi = snapshot.rsi;
    if price < buy_low * 0.97 || price > buy_high * 1.05 || rsi > max_rsi {
        return Screened::Filtered;
    }

    let center = (buy_low + buy_high) / 2.0;
    let band_distance_pct = (price - center).abs() / price * 100.0;
    let bias = short_term_bias(&snapshot).direction;
    let score = bias.scan_points()
        + (3.0 - band_distance_pct).max(0.0)
        + (2.0 - (rsi - 50.0).abs() / 10.0).max(0.0);

    let sl0 = buy_low * 0.97;
    Screened::Candidate(ScanCandidate {
        symbol: symbol.to_string(),
        price,
        rsi,
        bias,
        band_distance_pct,
        buy_low,
        buy_high,
        tp1,
        sl0,
        reward_risk: reward_risk(price, Some(tp1), Some(sl0)),
        score,
    })
}
