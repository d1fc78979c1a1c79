use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// UTC calendar date of a unix timestamp in seconds.
pub fn date_of(timestamp: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub symbol: String,
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        date_of(self.timestamp)
    }

    /// True range against the previous close; the first bar of a series only has `high - low`.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        let span = self.high - self.low;
        match prev_close {
            Some(prev) => span
                .max((self.high - prev).abs())
                .max((self.low - prev).abs()),
            None => span,
        }
    }
}
