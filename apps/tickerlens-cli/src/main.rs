mod commands;
mod infra;
mod obs;
mod output;

use clap::{Parser, Subcommand};
use commands::Command;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tickerlens")]
#[command(
    about = "Price levels, state labels and market mood from local bar files",
    version,
    arg_required_else_help = true
)]
#[command(
    after_help = "Examples:\n  tickerlens --config configs/sample.toml analyze NVDA --mode swing\n  tickerlens --config configs/sample.toml analyze TSLA --holding holding --avg-price 180 --shares 10\n  tickerlens --config configs/sample.toml scan --json\n  tickerlens --config configs/sample.toml market\n  tickerlens --config configs/sample.toml validate --strict\n"
)]
struct Cli {
    /// Config file path (TOML). If omitted, uses env TICKERLENS_CONFIG.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (overridden by env TICKERLENS_LOG).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log format: text | json.
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    /// Serve Prometheus metrics on host:port while the command runs.
    #[arg(long, global = true)]
    metrics_addr: Option<String>,

    /// Print a JSON report instead of human output.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Levels, state and signals for one or more symbols (defaults to `[run].symbols`).
    Analyze {
        symbols: Vec<String>,
        /// day | swing | long-term (defaults to `[run].mode`).
        #[arg(long)]
        mode: Option<String>,
        /// new-entry | holding
        #[arg(long, default_value = "new-entry")]
        holding: String,
        #[arg(long)]
        avg_price: Option<f64>,
        #[arg(long)]
        shares: Option<f64>,
        /// Latest quote to classify against instead of the last daily close.
        #[arg(long)]
        price_now: Option<f64>,
        /// Also score the last two sessions of 5-minute bars.
        #[arg(long, default_value_t = false)]
        intraday: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Screen the candidate list for entries near their pullback band.
    Scan {
        #[arg(long)]
        mode: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Macro score and market verdict from the overview file.
    Market {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Data quality of every `[run].symbols` series.
    Validate {
        #[arg(long)]
        mode: Option<String>,
        #[arg(long, default_value_t = false)]
        strict: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = obs::init_tracing(&cli.log_level, &cli.log_format) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = obs::init_metrics(cli.metrics_addr.as_deref()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let config = match resolve_config_path(cli.config) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let command = match cli.command {
        CliCommand::Analyze {
            symbols,
            mode,
            holding,
            avg_price,
            shares,
            price_now,
            intraday,
            out,
        } => Command::Analyze {
            symbols,
            mode,
            holding,
            avg_price,
            shares,
            price_now,
            intraday,
            out,
        },
        CliCommand::Scan { mode, out } => Command::Scan { mode, out },
        CliCommand::Market { out } => Command::Market { out },
        CliCommand::Validate { mode, strict, out } => Command::Validate { mode, strict, out },
    };

    if let Err(err) = commands::run(&config, command, cli.json) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn resolve_config_path(flag: Option<PathBuf>) -> Result<PathBuf, String> {
    flag.or_else(|| {
        std::env::var("TICKERLENS_CONFIG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    })
    .ok_or_else(|| "missing --config (or env TICKERLENS_CONFIG)".to_string())
}
