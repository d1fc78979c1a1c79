use crate::infra::build_adapters;
use crate::output;
use std::path::PathBuf;
use tickerlens_application::config::Config;
use tickerlens_application::resolve_mode;

pub(super) fn run_validate(
    config: &Config,
    mode: Option<String>,
    strict: bool,
    out: Option<PathBuf>,
    json: bool,
) -> Result<(), String> {
    let mode = resolve_mode(config, mode.as_deref())?;
    if !json {
        super::common::print_config_summary("validate", config, mode.mode.as_str());
    }

    let adapters = build_adapters(config);
    let report = tickerlens_application::validation::validate(
        config,
        &mode,
        strict,
        adapters.market_data.as_ref(),
    )?;

    super::common::emit(
        config,
        "validate",
        report.clone(),
        out,
        json,
        adapters.reports.as_ref(),
        || output::render_validation(&report),
    )
}
