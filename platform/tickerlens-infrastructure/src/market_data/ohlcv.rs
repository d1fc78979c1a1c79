use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tickerlens_domain::value_objects::bar::PriceBar;

#[derive(Debug, Deserialize)]
pub struct OhlcvRecord {
    #[serde(alias = "Date", alias = "Datetime", alias = "timestamp")]
    pub date: String,
    #[serde(alias = "Open")]
    pub open: Option<f64>,
    #[serde(alias = "High")]
    pub high: Option<f64>,
    #[serde(alias = "Low")]
    pub low: Option<f64>,
    #[serde(alias = "Close")]
    pub close: Option<f64>,
    #[serde(alias = "Volume")]
    pub volume: Option<f64>,
}

/// Reads `date,open,high,low,close,volume` rows in file order.
///
/// Rows with an empty field are dropped; everything else, including duplicated or
/// out-of-order timestamps and non-positive closes, is returned as-is for quality checks.
pub fn load_csv(path: &Path, symbol: &str) -> Result<Vec<PriceBar>, String> {
    let file = File::open(path)
        .map_err(|err| format!("failed to open OHLCV CSV {}: {}", path.display(), err))?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut bars = Vec::new();
    for (idx, result) in reader.deserialize::<OhlcvRecord>().enumerate() {
        let record = result.map_err(|err| format!("failed to parse CSV row {}: {}", idx + 1, err))?;
        let timestamp = parse_timestamp(&record.date)
            .map_err(|err| format!("CSV row {}: {}", idx + 1, err))?;

        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ) else {
            continue;
        };

        bars.push(PriceBar {
            symbol: symbol.to_string(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
    }
    Ok(bars)
}

pub fn parse_timestamp(value: &str) -> Result<i64, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%z") {
        return Ok(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.timestamp());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        let dt: DateTime<Utc> = Utc.from_utc_datetime(&naive);
        return Ok(dt.timestamp());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive).timestamp());
        }
    }

    Err(format!("unsupported timestamp format: {}", value))
}
