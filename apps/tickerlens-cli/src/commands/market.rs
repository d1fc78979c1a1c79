use crate::infra::build_adapters;
use crate::output;
use std::path::PathBuf;
use tickerlens_application::config::Config;
use tickerlens_application::market::market_overview;

pub(super) fn run_market(config: &Config, out: Option<PathBuf>, json: bool) -> Result<(), String> {
    if !json {
        super::common::print_config_summary("market", config, &config.run.mode);
    }

    let adapters = build_adapters(config);
    let report = market_overview(config, adapters.macro_data.as_deref());

    super::common::emit(
        config,
        "market",
        super::common::to_json("market", &report)?,
        out,
        json,
        adapters.reports.as_ref(),
        || output::render_market(&report),
    )
}
