use std::path::{Path, PathBuf};
use tickerlens_application::config::Config;
use tickerlens_application::meta::report_meta;
use tickerlens_domain::repositories::reports::ReportWriter;

pub(super) fn print_config_summary(command: &str, config: &Config, mode: &str) {
    println!(
        "tickerlens: {} (mode={}, data_dir={}, macro={}, out_dir={})",
        command,
        mode,
        config.paths.data_dir,
        config.paths.macro_path.as_deref().unwrap_or("none"),
        config.paths.out_dir.as_deref().unwrap_or("none"),
    );
}

/// `--out`, else `<out_dir>/<kind>.json` when `[paths].out_dir` is set.
fn report_path(config: &Config, kind: &str, out: Option<PathBuf>) -> Option<PathBuf> {
    out.or_else(|| {
        config
            .paths
            .out_dir
            .as_deref()
            .map(|dir| Path::new(dir).join(format!("{kind}.json")))
    })
}

/// Wraps `body` with report metadata, writes it when a destination is configured and prints
/// either the JSON document or the human rendering.
pub(super) fn emit(
    config: &Config,
    kind: &str,
    body: serde_json::Value,
    out: Option<PathBuf>,
    json: bool,
    writer: &dyn ReportWriter,
    human: impl FnOnce() -> String,
) -> Result<(), String> {
    let document = serde_json::json!({
        "meta": report_meta(kind),
        "report": body,
    });

    if let Some(path) = report_path(config, kind, out) {
        writer.write_json(&path, &document)?;
        tracing::info!(path = %path.display(), kind, "report written");
    }

    if json {
        let text = serde_json::to_string_pretty(&document)
            .map_err(|err| format!("failed to serialize {kind} report: {err}"))?;
        println!("{text}");
    } else {
        print!("{}", human());
    }
    Ok(())
}

pub(super) fn to_json<T: serde::Serialize>(kind: &str, value: &T) -> Result<serde_json::Value, String> {
    serde_json::to_value(value).map_err(|err| format!("failed to serialize {kind} report: {err}"))
}
