use std::cell::Cell;
use std::collections::HashMap;
use tickerlens_application::analysis::{
    analyze, analyze_many, AnalysisDeps, AnalyzeRequest, SymbolOutcome, UnavailableReason,
};
use tickerlens_application::config::{parse_config, Config};
use tickerlens_application::market::market_overview;
use tickerlens_application::scanning::scan;
use tickerlens_application::validation::validate;
use tickerlens_domain::repositories::cache::{AnalysisCache, RecentSymbols};
use tickerlens_domain::repositories::macro_data::MacroRepository;
use tickerlens_domain::repositories::market_data::{
    BarInterval, BarQuery, FetchError, MarketDataRepository,
};
use tickerlens_domain::services::indicators::IndicatorConfig;
use tickerlens_domain::services::macro_score::{MacroOverview, MarketMood, Quote};
use tickerlens_domain::services::ohlcv::DataQualityReport;
use tickerlens_domain::value_objects::bar::PriceBar;
use tickerlens_domain::value_objects::position::Position;
use tickerlens_domain::value_objects::trading_mode::ModeConfig;
use tickerlens_infrastructure::cache::{LruAnalysisCache, RecentSymbolList};

const DAY: i64 = 86_400;
const START: i64 = 1_700_000_000;

fn bar(symbol: &str, i: usize, close: f64) -> PriceBar {
    PriceBar {
        symbol: symbol.to_string(),
        timestamp: START + i as i64 * DAY,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000.0 + (i % 7) as f64 * 100.0,
    }
}

/// Range-bound series ending half a point above its mean.
fn sideways(symbol: &str, n: usize) -> Vec<PriceBar> {
    (0..n)
        .map(|i| {
            let close = if (n - 1 - i) % 2 == 0 { 100.5 } else { 99.5 };
            bar(symbol, i, close)
        })
        .collect()
}

fn uptrend(symbol: &str, n: usize) -> Vec<PriceBar> {
    (0..n)
        .map(|i| bar(symbol, i, 50.0 * 1.01f64.powi(i as i32)))
        .collect()
}

#[derive(Default)]
struct FakeMarketDataRepo {
    daily: HashMap<String, Vec<PriceBar>>,
    reports: HashMap<String, DataQualityReport>,
    calls: Cell<usize>,
}

impl FakeMarketDataRepo {
    fn with(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.daily.insert(symbol.to_string(), bars);
        self
    }
}

impl MarketDataRepository for FakeMarketDataRepo {
    fn load_bars(&self, query: &BarQuery) -> Result<(Vec<PriceBar>, DataQualityReport), FetchError> {
        self.calls.set(self.calls.get() + 1);
        if query.interval != BarInterval::Daily {
            return Err(FetchError::NotFound);
        }
        let bars = self.daily.get(&query.symbol).ok_or(FetchError::NotFound)?;
        let report = self.reports.get(&query.symbol).cloned().unwrap_or(DataQualityReport {
            bars: bars.len(),
            ..DataQualityReport::default()
        });
        Ok((bars.clone(), report))
    }
}

struct FakeMacroRepo(Result<MacroOverview, FetchError>);

impl MacroRepository for FakeMacroRepo {
    fn load_overview(&self) -> Result<MacroOverview, FetchError> {
        self.0.clone()
    }
}

fn config(extra: &str) -> Config {
    let toml_str = format!(
        "[run]\nmode = \"swing\"\nsymbols = [\"FLAT\", \"TREND\"]\n\n[paths]\ndata_dir = \"data/\"\n{extra}"
    );
    parse_config(&toml_str).expect("config")
}

fn request(symbol: &str, position: Position) -> AnalyzeRequest {
    AnalyzeRequest {
        symbol: symbol.to_string(),
        mode: ModeConfig::for_mode(tickerlens_domain::value_objects::trading_mode::TradingMode::Swing),
        position,
        price_now: None,
        intraday: false,
    }
}

#[test]
fn analyze_new_entry_produces_levels_and_state() {
    let repo = FakeMarketDataRepo::default().with("FLAT", sideways("FLAT", 160));
    let indicators = IndicatorConfig::default();
    let deps = AnalysisDeps {
        market_data: &repo,
        macro_data: None,
        indicators: &indicators,
    };

    let outcome = analyze(&request("FLAT", Position::new_entry()), &deps);
    let analysis = outcome.analysis().expect("ready");

    assert_eq!(analysis.symbol, "FLAT");
    assert_eq!(analysis.bars, 160);
    assert!((analysis.price - 100.5).abs() < 1e-9);
    assert!(!analysis.state_name.is_empty());
    assert_eq!(analysis.market.mood, MarketMood::Neutral);
    assert!(analysis.unrealized_pct.is_none());
    assert!(analysis.intraday.is_none());
    let (low, high) = (
        analysis.levels.buy_low.expect("buy_low"),
        analysis.levels.buy_high.expect("buy_high"),
    );
    assert!(low <= high);
    assert!(analysis.levels.sl0.expect("sl0") < low);
}

#[test]
fn analyze_holder_reports_unrealized_gain() {
    let repo = FakeMarketDataRepo::default().with("FLAT", sideways("FLAT", 160));
    let indicators = IndicatorConfig::default();
    let deps = AnalysisDeps {
        market_data: &repo,
        macro_data: None,
        indicators: &indicators,
    };

    let mut req = request("FLAT", Position::holding(Some(90.0), Some(10.0)));
    req.price_now = Some(99.0);
    req.intraday = true;
    let outcome = analyze(&req, &deps);
    let analysis = outcome.analysis().expect("ready");

    assert!((analysis.price - 99.0).abs() < 1e-9);
    let pct = analysis.unrealized_pct.expect("pct");
    assert!((pct - 10.0).abs() < 1e-9);
    assert!((analysis.unrealized_pnl.expect("pnl") - 90.0).abs() < 1e-9);
    assert!(analysis.classification.phase.is_holder_phase());
    // Daily plus the 5-minute attempt.
    assert_eq!(repo.calls.get(), 2);
}

#[test]
fn missing_and_short_series_are_unavailable() {
    let repo = FakeMarketDataRepo::default().with("SHORT", sideways("SHORT", 30));
    let indicators = IndicatorConfig::default();
    let deps = AnalysisDeps {
        market_data: &repo,
        macro_data: None,
        indicators: &indicators,
    };

    match analyze(&request("NOPE", Position::new_entry()), &deps) {
        SymbolOutcome::Unavailable { symbol, reason } => {
            assert_eq!(symbol, "NOPE");
            assert!(matches!(reason, UnavailableReason::NoData { .. }));
        }
        SymbolOutcome::Ready(_) => panic!("expected unavailable"),
    }

    match analyze(&request("SHORT", Position::new_entry()), &deps) {
        SymbolOutcome::Unavailable { reason, .. } => assert_eq!(
            reason,
            UnavailableReason::InsufficientHistory {
                bars: 30,
                required: indicators.min_bars(),
            }
        ),
        SymbolOutcome::Ready(_) => panic!("expected insufficient history"),
    }
}

#[test]
fn analyze_many_isolates_failures_and_uses_cache() {
    let repo = FakeMarketDataRepo::default().with("FLAT", sideways("FLAT", 160));
    let indicators = IndicatorConfig::default();
    let deps = AnalysisDeps {
        market_data: &repo,
        macro_data: None,
        indicators: &indicators,
    };
    let mut cache = LruAnalysisCache::new(8);
    let mut recent = RecentSymbolList::new(5);

    let requests = vec![
        request("FLAT", Position::new_entry()),
        request("MISSING", Position::new_entry()),
        request("FLAT", Position::new_entry()),
    ];
    let outcomes = analyze_many(&requests, &deps, &mut cache, &mut recent);

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].analysis().is_some());
    assert!(outcomes[1].analysis().is_none());
    assert_eq!(outcomes[1].symbol(), "MISSING");
    assert!(outcomes[2].analysis().is_some());
    assert_eq!(repo.calls.get(), 2);
    assert_eq!(cache.len(), 1);
    assert_eq!(recent.list(), vec!["FLAT", "MISSING"]);
}

#[test]
fn analyze_many_cache_separates_share_counts_and_mode_knobs() {
    let repo = FakeMarketDataRepo::default().with("FLAT", sideways("FLAT", 160));
    let indicators = IndicatorConfig::default();
    let deps = AnalysisDeps {
        market_data: &repo,
        macro_data: None,
        indicators: &indicators,
    };
    let mut cache = LruAnalysisCache::new(8);
    let mut recent = RecentSymbolList::new(5);

    let mut wider_targets = request("FLAT", Position::holding(Some(90.0), Some(10.0)));
    wider_targets.mode.target_pct = 0.12;
    let requests = vec![
        request("FLAT", Position::holding(Some(90.0), Some(10.0))),
        request("FLAT", Position::holding(Some(90.0), Some(1000.0))),
        wider_targets,
    ];
    let outcomes = analyze_many(&requests, &deps, &mut cache, &mut recent);

    let pnl = |i: usize| {
        outcomes[i]
            .analysis()
            .and_then(|a| a.unrealized_pnl)
            .expect("pnl")
    };
    assert!((pnl(0) - 105.0).abs() < 1e-9);
    assert!((pnl(1) - 10_500.0).abs() < 1e-6);
    assert_eq!(repo.calls.get(), 3);
    assert_eq!(cache.len(), 3);
}

#[test]
fn scan_keeps_band_candidates_and_reports_skips() {
    let repo = FakeMarketDataRepo::default()
        .with("FLAT", sideways("FLAT", 160))
        .with("TREND", uptrend("TREND", 160))
        .with("SHORT", sideways("SHORT", 30));
    let indicators = IndicatorConfig::default();
    let deps = AnalysisDeps {
        market_data: &repo,
        macro_data: None,
        indicators: &indicators,
    };
    let cfg = config("\n[scan]\ncandidates = [\"flat\", \"TREND\", \"SHORT\", \"MISSING\"]\n");
    let mode = ModeConfig::by_name("swing").expect("mode");

    let report = scan(&cfg, &mode, &deps).expect("scan");

    assert_eq!(report.candidates.len(), 1);
    let top = &report.candidates[0];
    assert_eq!(top.symbol, "FLAT");
    assert!(top.rsi <= 65.0);
    assert!(top.score > 0.0);
    assert!(top.sl0 < top.buy_low);
    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(skipped, vec!["SHORT", "MISSING"]);
}

#[test]
fn market_overview_degrades_to_unavailable() {
    let cfg = config("");
    let report = market_overview(&cfg, None);
    assert!(!report.available);
    assert_eq!(report.score.mood, MarketMood::Neutral);

    let failing = FakeMacroRepo(Err(FetchError::Unavailable("offline".to_string())));
    let report = market_overview(&cfg, Some(&failing));
    assert!(!report.available);
    assert!(report.verdict.is_none());

    let mut overview = MacroOverview::default();
    overview.futures.nasdaq = Quote {
        last: Some(18_000.0),
        chg_pct: Some(0.8),
        state: None,
    };
    overview.fgi = Some(70.0);
    let healthy = FakeMacroRepo(Ok(overview));
    let report = market_overview(&cfg, Some(&healthy));
    assert!(report.available);
    assert_eq!(report.fgi, Some(70.0));
    assert!(report.verdict.is_some());
}

#[test]
fn strict_validation_fails_on_quality_issues() {
    let mut repo = FakeMarketDataRepo::default()
        .with("FLAT", sideways("FLAT", 60))
        .with("TREND", uptrend("TREND", 60));
    repo.reports.insert(
        "TREND".to_string(),
        DataQualityReport {
            bars: 60,
            duplicates: 2,
            ..DataQualityReport::default()
        },
    );
    let cfg = config("");
    let mode = ModeConfig::by_name("swing").expect("mode");

    let relaxed = validate(&cfg, &mode, false, &repo).expect("non-strict validate");
    assert_eq!(relaxed["symbols"].as_array().map(Vec::len), Some(2));
    assert_eq!(relaxed["issues"].as_array().map(Vec::len), Some(1));
    assert_eq!(relaxed["symbols"][0]["ohlcv"]["rows"], 60);

    let err = validate(&cfg, &mode, true, &repo).expect_err("strict");
    assert!(err.contains("TREND"));

    let empty = parse_config("[run]\nmode = \"swing\"\n\n[paths]\ndata_dir = \"data/\"\n")
        .expect("config");
    assert!(validate(&empty, &mode, false, &repo).is_err());
}
