use crate::infra::build_adapters;
use crate::output;
use std::path::PathBuf;
use tickerlens_application::analysis::{analyze_many, AnalysisDeps, AnalyzeRequest, SymbolAnalysis};
use tickerlens_application::config::Config;
use tickerlens_application::{normalize_symbol, resolve_mode};
use tickerlens_domain::repositories::cache::RecentSymbols;
use tickerlens_domain::value_objects::position::{HoldingType, Position};
use tickerlens_infrastructure::cache::{LruAnalysisCache, RecentSymbolList};
use tracing::warn;

pub(super) struct AnalyzeArgs {
    pub symbols: Vec<String>,
    pub mode: Option<String>,
    pub holding: String,
    pub avg_price: Option<f64>,
    pub shares: Option<f64>,
    pub price_now: Option<f64>,
    pub intraday: bool,
}

fn build_position(args: &AnalyzeArgs) -> Result<Position, String> {
    match HoldingType::parse(&args.holding)? {
        HoldingType::Holding => Ok(Position::holding(args.avg_price, args.shares)),
        HoldingType::NewEntry => {
            if args.avg_price.is_some() || args.shares.is_some() {
                warn!("--avg-price/--shares ignored for new entries");
            }
            Ok(Position::new_entry())
        }
    }
}

pub(super) fn run_analyze(
    config: &Config,
    args: AnalyzeArgs,
    out: Option<PathBuf>,
    json: bool,
) -> Result<(), String> {
    let mode = resolve_mode(config, args.mode.as_deref())?;
    let position = build_position(&args)?;

    let aliases = config.aliases();
    let raw_symbols = if args.symbols.is_empty() {
        &config.run.symbols
    } else {
        &args.symbols
    };
    if raw_symbols.is_empty() {
        return Err("analyze: no symbols given and [run].symbols is empty".to_string());
    }
    let requests: Vec<AnalyzeRequest> = raw_symbols
        .iter()
        .map(|raw| AnalyzeRequest {
            symbol: normalize_symbol(raw, &aliases),
            mode: mode.clone(),
            position,
            price_now: args.price_now,
            intraday: args.intraday || config.intraday_enabled(),
        })
        .collect();

    if !json {
        super::common::print_config_summary("analyze", config, mode.mode.as_str());
    }

    let adapters = build_adapters(config);
    let deps = AnalysisDeps {
        market_data: adapters.market_data.as_ref(),
        macro_data: adapters.macro_data.as_deref(),
        indicators: &config.indicators,
    };
    let mut cache = LruAnalysisCache::<SymbolAnalysis>::new(config.cache_capacity());
    let mut recent = RecentSymbolList::new(config.recent_capacity());
    let outcomes = analyze_many(&requests, &deps, &mut cache, &mut recent);

    let body = serde_json::json!({
        "mode": mode.mode.as_str(),
        "holding": position.holding.as_str(),
        "results": super::common::to_json("analyze", &outcomes)?,
        "recent": recent.list(),
    });
    super::common::emit(
        config,
        "analyze",
        body,
        out,
        json,
        adapters.reports.as_ref(),
        || outcomes.iter().map(output::render_outcome).collect(),
    )?;

    if outcomes.iter().all(|o| o.analysis().is_none()) {
        return Err("no symbol could be analyzed".to_string());
    }
    Ok(())
}
