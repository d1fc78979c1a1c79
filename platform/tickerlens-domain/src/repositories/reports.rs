use std::path::Path;

pub trait ReportWriter {
    fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<(), String>;
}
