use chrono::{SecondsFormat, Utc};

/// Envelope metadata attached to every JSON report.
pub fn report_meta(kind: &str) -> serde_json::Value {
    serde_json::json!({
        "kind": kind,
        "tool": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "generated_at": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

#[cfg(test)]
mod tests {
    use super::report_meta;

    #[test]
    fn meta_carries_kind_and_timestamp() {
        let meta = report_meta("scan");
        assert_eq!(meta["kind"], "scan");
        let ts = meta["generated_at"].as_str().expect("timestamp");
        assert!(ts.ends_with('Z'));
    }
}
