use serde::Serialize;
use std::time::Instant;
use tickerlens_domain::repositories::cache::{AnalysisCache, RecentSymbols};
use tickerlens_domain::repositories::macro_data::MacroRepository;
use tickerlens_domain::repositories::market_data::{BarQuery, MarketDataRepository};
use tickerlens_domain::services::indicators::{build_indicators, IndicatorConfig, IndicatorSnapshot};
use tickerlens_domain::services::intraday::{intraday_score, IntradayScore};
use tickerlens_domain::services::levels::{compute_levels, LevelSet};
use tickerlens_domain::services::macro_score::{market_score, MarketScore};
use tickerlens_domain::services::ohlcv::{sanitize_bars, DataQualityReport};
use tickerlens_domain::services::profile::{heavy_days, volume_profile, HeavyDay, VolumeBin};
use tickerlens_domain::services::signals::{
    gap_info, reward_risk, risk_alerts, short_term_bias, Bias, GapInfo, RiskAlert,
};
use tickerlens_domain::services::state::{classify, Classification};
use tickerlens_domain::value_objects::period::HistoryPeriod;
use tickerlens_domain::value_objects::position::{HoldingType, Position};
use tickerlens_domain::value_objects::trading_mode::{ModeConfig, TradingMode};
use tracing::{debug, info_span, warn};

const PROFILE_BINS: usize = 5;
const HEAVY_DAYS: usize = 3;

#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub symbol: String,
    pub mode: ModeConfig,
    pub position: Position,
    /// Latest quote (e.g. extended hours); the last daily close is used when absent.
    pub price_now: Option<f64>,
    pub intraday: bool,
}

impl AnalyzeRequest {
    /// Every input that shapes the result, including the full mode knob set.
    fn cache_key(&self) -> String {
        let opt = |v: Option<f64>| v.map(|x| format!("{x}")).unwrap_or_default();
        let mode = serde_json::to_string(&self.mode)
            .unwrap_or_else(|_| format!("{:?}", self.mode));
        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.symbol,
            mode,
            self.position.holding.as_str(),
            opt(self.position.avg_price),
            opt(self.position.shares),
            opt(self.price_now),
            self.intraday
        )
    }
}

pub struct AnalysisDeps<'a> {
    pub market_data: &'a dyn MarketDataRepository,
    pub macro_data: Option<&'a dyn MacroRepository>,
    pub indicators: &'a IndicatorConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolAnalysis {
    pub symbol: String,
    pub mode: TradingMode,
    pub holding: HoldingType,
    pub as_of: i64,
    pub bars: usize,
    pub price: f64,
    pub snapshot: IndicatorSnapshot,
    pub levels: LevelSet,
    pub classification: Classification,
    pub state_name: &'static str,
    pub bias: Bias,
    pub gap: Option<GapInfo>,
    pub alerts: Vec<RiskAlert>,
    pub reward_risk: Option<f64>,
    pub volume_profile: Vec<VolumeBin>,
    pub heavy_days: Vec<HeavyDay>,
    pub intraday: Option<IntradayScore>,
    pub market: MarketScore,
    pub unrealized_pct: Option<f64>,
    pub unrealized_pnl: Option<f64>,
    pub data_quality: DataQualityReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnavailableReason {
    NoData { detail: String },
    InsufficientHistory { bars: usize, required: usize },
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::NoData { detail } => {
                write!(f, "data unavailable for this symbol/period ({detail})")
            }
            UnavailableReason::InsufficientHistory { bars, required } => write!(
                f,
                "indicators could not be computed (insufficient history: {bars} bars, need {required})"
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SymbolOutcome {
    Ready(Box<SymbolAnalysis>),
    Unavailable {
        symbol: String,
        reason: UnavailableReason,
    },
}

impl SymbolOutcome {
    pub fn symbol(&self) -> &str {
        match self {
            SymbolOutcome::Ready(analysis) => &analysis.symbol,
            SymbolOutcome::Unavailable { symbol, .. } => symbol,
        }
    }

    pub fn analysis(&self) -> Option<&SymbolAnalysis> {
        match self {
            SymbolOutcome::Ready(analysis) => Some(analysis),
            SymbolOutcome::Unavailable { .. } => None,
        }
    }

    fn unavailable(symbol: &str, reason: UnavailableReason) -> Self {
        let label = match reason {
            UnavailableReason::NoData { .. } => "no_data",
            UnavailableReason::InsufficientHistory { .. } => "insufficient_history",
        };
        metrics::counter!("tickerlens.analyze.unavailable", "reason" => label).increment(1);
        warn!(symbol = %symbol, reason = %reason, "symbol unavailable");
        SymbolOutcome::Unavailable {
            symbol: symbol.to_string(),
            reason,
        }
    }
}

/// Macro score from the overview repository; any failure reads as a neutral market.
pub fn load_market_score(macro_data: Option<&dyn MacroRepository>) -> MarketScore {
    let Some(repo) = macro_data else {
        return MarketScore::neutral();
    };
    match repo.load_overview() {
        Ok(overview) => market_score(&overview),
        Err(err) => {
            warn!(error = %err, "macro overview unavailable; using neutral market score");
            MarketScore::neutral()
        }
    }
}

pub fn analyze(request: &AnalyzeRequest, deps: &AnalysisDeps<'_>) -> SymbolOutcome {
    let market = load_market_score(deps.macro_data);
    analyze_with_market(request, deps, &market)
}

pub(crate) fn analyze_with_market(
    request: &AnalyzeRequest,
    deps: &AnalysisDeps<'_>,
    market: &MarketScore,
) -> SymbolOutcome {
    let _span = info_span!(
        "analyze",
        symbol = %request.symbol,
        mode = request.mode.mode.as_str(),
        holding = request.position.holding.as_str()
    )
    .entered();
    metrics::counter!("tickerlens.analyze.requests").increment(1);

    let symbol = request.symbol.as_str();
    let period = match HistoryPeriod::parse(&request.mode.period) {
        Ok(period) => period,
        Err(err) => return SymbolOutcome::unavailable(symbol, UnavailableReason::NoData { detail: err }),
    };

    let stage_start = Instant::now();
    let loaded = deps
        .market_data
        .load_bars(&BarQuery::daily(symbol, period));
    metrics::histogram!("tickerlens.analyze.load_bars_ms")
        .record(stage_start.elapsed().as_millis() as f64);
    let (bars, data_quality) = match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            return SymbolOutcome::unavailable(
                symbol,
                UnavailableReason::NoData {
                    detail: err.to_string(),
                },
            )
        }
    };

    let bars = sanitize_bars(bars);
    if bars.is_empty() {
        return SymbolOutcome::unavailable(
            symbol,
            UnavailableReason::NoData {
                detail: "no usable bars".to_string(),
            },
        );
    }

    let frame = build_indicators(&bars, deps.indicators);
    let Some(snapshot) = frame.snapshot() else {
        return SymbolOutcome::unavailable(
            symbol,
            UnavailableReason::InsufficientHistory {
                bars: bars.len(),
                required: deps.indicators.min_bars(),
            },
        );
    };
    debug!(rows = frame.len(), bars = bars.len(), "indicators built");

    let position = &request.position;
    let levels = compute_levels(&frame, &request.mode, position, request.price_now)
        .unwrap_or_default();
    let classification = classify(
        &snapshot,
        &request.mode,
        position,
        request.price_now,
        &levels,
    );
    let shown = levels.for_phase(classification.phase);

    let price = request
        .price_now
        .filter(|p| p.is_finite() && *p > 0.0)
        .unwrap_or(snapshot.close);
    let gap = gap_info(&bars);
    let price_move_abs = match bars.as_slice() {
        [.., prev, last] => Some((last.close - prev.close).abs()),
        _ => None,
    };
    let alerts = risk_alerts(
        market.score,
        &snapshot,
        gap.map(|g| g.pct),
        Some(snapshot.atr),
        price_move_abs,
    );

    let intraday = if request.intraday {
        match deps.market_data.load_bars(&BarQuery::intraday(symbol)) {
            Ok((bars_5m, _)) => intraday_score(&sanitize_bars(bars_5m)),
            Err(err) => {
                debug!(error = %err, "intraday bars unavailable");
                None
            }
        }
    } else {
        None
    };

    metrics::counter!("tickerlens.analyze.ready", "phase" => classification.phase.tag())
        .increment(1);

    SymbolOutcome::Ready(Box::new(SymbolAnalysis {
        symbol: symbol.to_string(),
        mode: request.mode.mode,
        holding: position.holding,
        as_of: snapshot.timestamp,
        bars: bars.len(),
        price,
        snapshot,
        levels: shown,
        state_name: classification.state_name(),
        classification,
        bias: short_term_bias(&snapshot),
        gap,
        alerts,
        reward_risk: reward_risk(price, shown.tp1, shown.sl0),
        volume_profile: volume_profile(&bars, PROFILE_BINS),
        heavy_days: heavy_days(&bars, HEAVY_DAYS),
        intraday,
        market: market.clone(),
        unrealized_pct: position.unrealized_pct(price),
        unrealized_pnl: position.unrealized_pnl(price),
        data_quality,
    }))
}

/// Analyzes every request independently; one unavailable symbol never affects the others.
///
/// Ready results go through `cache` and every requested symbol is recorded in `recent`.
pub fn analyze_many(
    requests: &[AnalyzeRequest],
    deps: &AnalysisDeps<'_>,
    cache: &mut dyn AnalysisCache<SymbolAnalysis>,
    recent: &mut dyn RecentSymbols,
) -> Vec<SymbolOutcome> {
    let _span = info_span!("analyze_many", requests = requests.len()).entered();
    let market = load_market_score(deps.macro_data);

    requests
        .iter()
        .map(|request| {
            recent.record(&request.symbol);
            let key = request.cache_key();
            if let Some(hit) = cache.get(&key) {
                metrics::counter!("tickerlens.analyze.cache_hits").increment(1);
                return SymbolOutcome::Ready(Box::new(hit));
            }
            let outcome = analyze_with_market(request, deps, &market);
            match &outcome {
                SymbolOutcome::Ready(analysis) => cache.put(&key, analysis.as_ref().clone()),
                SymbolOutcome::Unavailable { .. } => {
                    cache.evict(&key);
                }
            }
            outcome
        })
        .collect()
}
