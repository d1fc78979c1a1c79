use crate::infra::build_adapters;
use crate::output;
use std::path::PathBuf;
use tickerlens_application::analysis::AnalysisDeps;
use tickerlens_application::config::Config;
use tickerlens_application::resolve_mode;
use tickerlens_application::scanning::scan;

pub(super) fn run_scan(
    config: &Config,
    mode: Option<String>,
    out: Option<PathBuf>,
    json: bool,
) -> Result<(), String> {
    let mode = resolve_mode(config, mode.as_deref())?;
    if !json {
        super::common::print_config_summary("scan", config, mode.mode.as_str());
    }

    let adapters = build_adapters(config);
    let deps = AnalysisDeps {
        market_data: adapters.market_data.as_ref(),
        macro_data: adapters.macro_data.as_deref(),
        indicators: &config.indicators,
    };
    let report = scan(config, &mode, &deps)?;

    super::common::emit(
        config,
        "scan",
        super::common::to_json("scan", &report)?,
        out,
        json,
        adapters.reports.as_ref(),
        || output::render_scan(&report),
    )
}
