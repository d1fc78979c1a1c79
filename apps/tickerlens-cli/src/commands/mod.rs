mod analyze;
mod common;
mod market;
mod scan;
mod validate;

use std::path::{Path, PathBuf};
use tickerlens_application::config::{load_config, Config};

pub enum Command {
    Analyze {
        symbols: Vec<String>,
        mode: Option<String>,
        holding: String,
        avg_price: Option<f64>,
        shares: Option<f64>,
        price_now: Option<f64>,
        intraday: bool,
        out: Option<PathBuf>,
    },
    Scan {
        mode: Option<String>,
        out: Option<PathBuf>,
    },
    Market {
        out: Option<PathBuf>,
    },
    Validate {
        mode: Option<String>,
        strict: bool,
        out: Option<PathBuf>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Analyze { .. } => "analyze",
            Command::Scan { .. } => "scan",
            Command::Market { .. } => "market",
            Command::Validate { .. } => "validate",
        }
    }
}

pub fn run(config_path: &Path, command: Command, json: bool) -> Result<(), String> {
    let name = command.name();
    let _span = tracing::info_span!("command", name, config = %config_path.display()).entered();
    let config = load_config(config_path)?;
    let result = dispatch(&config, command, json);
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::counter!("tickerlens.cli.commands_total", "command" => name, "result" => result_label)
        .increment(1);
    result
}

fn dispatch(
    config: &Config,
    command: Command,
    json: bool,
) -> Result<(), String> {
    match command {
        Command::Analyze {
            symbols,
            mode,
            holding,
            avg_price,
            shares,
            price_now,
            intraday,
            out,
        } => analyze::run_analyze(
            config,
            analyze::AnalyzeArgs {
                symbols,
                mode,
                holding,
                avg_price,
                shares,
                price_now,
                intraday,
            },
            out,
            json,
        ),
        Command::Scan { mode, out } => scan::run_scan(config, mode, out, json),
        Command::Market { out } => market::run_market(config, out, json),
        Command::Validate { mode, strict, out } => {
            validate::run_validate(config, mode, strict, out, json)
        }
    }
}
