pub mod ohlcv;

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Instant;
use tickerlens_domain::repositories::market_data::{
    BarInterval, BarQuery, FetchError, MarketDataRepository,
};
use tickerlens_domain::services::ohlcv::{
    data_quality_from_bars, sanitize_bars, trim_to_period, DataQualityReport,
};
use tickerlens_domain::value_objects::bar::PriceBar;
use tracing::{debug, warn};

/// Reads bars from `<data_dir>/<SYMBOL>.csv` (daily) and `<data_dir>/<SYMBOL>_5m.csv`.
#[derive(Debug, Clone)]
pub struct CsvMarketDataRepository {
    data_dir: PathBuf,
}

impl CsvMarketDataRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, symbol: &str, interval: BarInterval) -> PathBuf {
        let file = match interval {
            BarInterval::Daily => format!("{symbol}.csv"),
            BarInterval::FiveMinute => format!("{symbol}_5m.csv"),
        };
        self.data_dir.join(file)
    }
}

fn record_load_metrics<T>(interval: BarInterval, start: Instant, result: &Result<T, FetchError>) {
    let result_label = match result {
        Ok(_) => "ok",
        Err(FetchError::NotFound) => "not_found",
        Err(FetchError::Unavailable(_)) => "unavailable",
        Err(FetchError::InvalidData(_)) => "invalid_data",
    };
    metrics::counter!(
        "tickerlens.infra.bars.load.calls_total",
        "interval" => interval.as_str(),
        "result" => result_label
    )
    .increment(1);
    metrics::histogram!("tickerlens.infra.bars.load_ms", "interval" => interval.as_str())
        .record(start.elapsed().as_millis() as f64);
}

impl MarketDataRepository for CsvMarketDataRepository {
    fn load_bars(&self, query: &BarQuery) -> Result<(Vec<PriceBar>, DataQualityReport), FetchError> {
        let start = Instant::now();
        let path = self.path_for(&query.symbol, query.interval);

        let result = match fs::metadata(&path) {
            Err(err) if err.kind() == ErrorKind::NotFound => Err(FetchError::NotFound),
            Err(err) => Err(FetchError::Unavailable(format!(
                "{}: {}",
                path.display(),
                err
            ))),
            Ok(_) => ohlcv::load_csv(&path, &query.symbol).map_err(FetchError::InvalidData),
        }
        .map(|raw| {
            let report = data_quality_from_bars(&raw, Some(query.interval.max_step_seconds()));
            let bars = trim_to_period(sanitize_bars(raw), &query.period);
            (bars, report)
        });

        match &result {
            Ok((bars, report)) => {
                if !report.is_clean() {
                    warn!(
                        symbol = %query.symbol,
                        duplicates = report.duplicates,
                        out_of_order = report.out_of_order,
                        invalid_close = report.invalid_close,
                        "bar file has quality issues"
                    );
                }
                debug!(
                    symbol = %query.symbol,
                    interval = query.interval.as_str(),
                    period = %query.period.label,
                    bars = bars.len(),
                    "bars loaded"
                );
            }
            Err(err) => debug!(symbol = %query.symbol, error = %err, "bars unavailable"),
        }
        record_load_metrics(query.interval, start, &result);
        result
    }
}
