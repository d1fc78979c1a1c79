use std::fs;
use std::path::Path;
use std::time::Instant;
use tickerlens_domain::repositories::reports::ReportWriter;

#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemReportWriter;

impl FilesystemReportWriter {
    pub fn new() -> Self {
        Self
    }
}

fn record_write_metrics(kind: &'static str, start: Instant, result: &Result<(), String>) {
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::counter!(
        "tickerlens.infra.reports.write.calls_total",
        "kind" => kind,
        "result" => result_label
    )
    .increment(1);
    metrics::histogram!("tickerlens.infra.reports.write_ms", "kind" => kind, "result" => result_label)
        .record(start.elapsed().as_millis() as f64);
}

fn write_pretty_json(path: &Path, value: &serde_json::Value) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create dir {}: {}", parent.display(), err))?;
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|err| format!("failed to serialize report json: {err}"))?;
    fs::write(path, json).map_err(|err| format!("failed to write {}: {}", path.display(), err))
}

impl ReportWriter for FilesystemReportWriter {
    fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<(), String> {
        let start = Instant::now();
        let result = write_pretty_json(path, value);
        record_write_metrics("json", start, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::FilesystemReportWriter;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tickerlens_domain::repositories::reports::ReportWriter;

    #[test]
    fn writes_pretty_json_and_creates_parent_dirs() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!(
            "tickerlens_reports_{}_{}",
            std::process::id(),
            now
        ));
        let path = dir.join("nested").join("analyze.json");

        let value = serde_json::json!({ "meta": { "kind": "analyze" }, "results": [] });
        FilesystemReportWriter::new()
            .write_json(&path, &value)
            .expect("write report");

        let contents = fs::read_to_string(&path).expect("read back");
        assert!(contents.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&contents).expect("json");
        assert_eq!(parsed, value);
        let _ = fs::remove_dir_all(&dir);
    }
}
