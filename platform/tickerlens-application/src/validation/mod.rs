use crate::config::Config;
use crate::shared::normalize_symbol;
use std::time::Instant;
use tickerlens_domain::repositories::market_data::{BarQuery, MarketDataRepository};
use tickerlens_domain::services::ohlcv::DataQualityReport;
use tickerlens_domain::value_objects::period::HistoryPeriod;
use tickerlens_domain::value_objects::trading_mode::ModeConfig;
use tracing::{info_span, warn};

/// Loads every `[run].symbols` series and reports its data quality. With `strict`, any fetch
/// failure, duplicate, out-of-order row or invalid close is an error.
pub fn validate(
    config: &Config,
    mode: &ModeConfig,
    strict: bool,
    market_data: &dyn MarketDataRepository,
) -> Result<serde_json::Value, String> {
    let _span = info_span!(
        "validate",
        strict = strict,
        mode = mode.mode.as_str(),
        symbols = config.run.symbols.len()
    )
    .entered();

    if config.run.symbols.is_empty() {
        return Err("validate: [run].symbols is empty".to_string());
    }
    let period = HistoryPeriod::parse(&mode.period)?;
    let aliases = config.aliases();

    let stage_start = Instant::now();
    let mut entries = Vec::new();
    let mut failures = Vec::new();
    for raw in &config.run.symbols {
        let symbol = normalize_symbol(raw, &aliases);
        match market_data.load_bars(&BarQuery::daily(&symbol, period.clone())) {
            Ok((_bars, report)) => {
                if !report.is_clean() {
                    failures.push(format!("{symbol}: {} data quality issues", report.strict_issues()));
                }
                metrics::gauge!("tickerlens.validate.duplicates", "symbol" => symbol.clone())
                    .set(report.duplicates as f64);
                metrics::gauge!("tickerlens.validate.out_of_order", "symbol" => symbol.clone())
                    .set(report.out_of_order as f64);
                metrics::gauge!("tickerlens.validate.invalid_close", "symbol" => symbol.clone())
                    .set(report.invalid_close as f64);
                entries.push(serde_json::json!({
                    "symbol": symbol,
                    "ohlcv": data_quality_json(&report),
                }));
            }
            Err(err) => {
                warn!(symbol = %symbol, error = %err, "failed to load bars");
                failures.push(format!("{symbol}: {err}"));
                entries.push(serde_json::json!({
                    "symbol": symbol,
                    "error": err.to_string(),
                }));
            }
        }
    }
    metrics::histogram!("tickerlens.validate.duration_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    if strict && !failures.is_empty() {
        return Err(format!(
            "strict validation failed: {}",
            failures.join("; ")
        ));
    }

    Ok(serde_json::json!({
        "period": period.label,
        "symbols": entries,
        "issues": failures,
        "strict": strict,
    }))
}

fn data_quality_json(report: &DataQualityReport) -> serde_json::Value {
    serde_json::json!({
        "rows": report.bars,
        "duplicates": report.duplicates,
        "gaps": report.gaps,
        "out_of_order": report.out_of_order,
        "invalid_close": report.invalid_close,
        "first_timestamp": report.first_timestamp,
        "last_timestamp": report.last_timestamp,
        "first_gap": report.first_gap,
        "first_duplicate": report.first_duplicate,
        "first_out_of_order": report.first_out_of_order,
        "first_invalid_close": report.first_invalid_close,
        "max_gap_seconds": report.max_gap_seconds,
    })
}
