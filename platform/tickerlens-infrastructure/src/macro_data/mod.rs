use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Instant;
use tickerlens_domain::repositories::macro_data::MacroRepository;
use tickerlens_domain::repositories::market_data::FetchError;
use tickerlens_domain::services::macro_score::MacroOverview;
use tracing::debug;

/// Macro overview stored as a JSON document (futures, rates/FX, FGI, indexes, ETFs, layers).
#[derive(Debug, Clone)]
pub struct JsonMacroRepository {
    path: PathBuf,
}

impl JsonMacroRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MacroRepository for JsonMacroRepository {
    fn load_overview(&self) -> Result<MacroOverview, FetchError> {
        let start = Instant::now();
        let result = match fs::read_to_string(&self.path) {
            Err(err) if err.kind() == ErrorKind::NotFound => Err(FetchError::NotFound),
            Err(err) => Err(FetchError::Unavailable(format!(
                "{}: {}",
                self.path.display(),
                err
            ))),
            Ok(contents) => serde_json::from_str::<MacroOverview>(&contents).map_err(|err| {
                FetchError::InvalidData(format!(
                    "failed to parse macro overview {}: {}",
                    self.path.display(),
                    err
                ))
            }),
        };

        let result_label = if result.is_ok() { "ok" } else { "err" };
        metrics::counter!("tickerlens.infra.macro.load.calls_total", "result" => result_label)
            .increment(1);
        metrics::histogram!("tickerlens.infra.macro.load_ms")
            .record(start.elapsed().as_millis() as f64);
        debug!(path = %self.path.display(), ok = result.is_ok(), "macro overview loaded");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::JsonMacroRepository;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tickerlens_domain::repositories::macro_data::MacroRepository;
    use tickerlens_domain::repositories::market_data::FetchError;

    fn unique_tmp_path(name: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("tickerlens_{name}_{}_{}", std::process::id(), now))
    }

    #[test]
    fn parses_partial_overview() {
        let path = unique_tmp_path("macro.json");
        let json = r#"{
            "futures": {"nasdaq": {"last": 18000.0, "chg_pct": 0.6}},
            "rates_fx": {"us10y": 4.2, "us10y_bp": -3.0},
            "fgi": 62,
            "etfs": [{"symbol": "QQQ", "chg_pct": 0.4, "market_state": "PRE"}],
            "bigtech": {"score": 2.5}
        }"#;
        fs::write(&path, json).expect("write json");

        let overview = JsonMacroRepository::new(&path)
            .load_overview()
            .expect("overview");
        assert_eq!(overview.futures.nasdaq.chg_pct, Some(0.6));
        assert_eq!(overview.futures.sp500.chg_pct, None);
        assert_eq!(overview.fgi, Some(62.0));
        assert_eq!(overview.etfs[0].symbol, "QQQ");
        assert_eq!(overview.bigtech.score, Some(2.5));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_and_malformed_files_are_errors() {
        let missing = JsonMacroRepository::new(unique_tmp_path("absent.json"));
        assert_eq!(missing.load_overview(), Err(FetchError::NotFound));

        let path = unique_tmp_path("broken.json");
        fs::write(&path, "{ not json").expect("write json");
        let err = JsonMacroRepository::new(&path)
            .load_overview()
            .expect_err("malformed");
        assert!(matches!(err, FetchError::InvalidData(_)));
        let _ = fs::remove_file(&path);
    }
}
