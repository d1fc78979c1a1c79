use crate::services::ohlcv::DataQualityReport;
use crate::value_objects::bar::PriceBar;
use crate::value_objects::period::HistoryPeriod;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarInterval {
    Daily,
    FiveMinute,
}

impl BarInterval {
    /// Largest spacing between consecutive bars that is not reported as a gap.
    pub fn max_step_seconds(&self) -> i64 {
        match self {
            // Long weekends.
            BarInterval::Daily => 4 * 86_400,
            BarInterval::FiveMinute => 300,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BarInterval::Daily => "1d",
            BarInterval::FiveMinute => "5m",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BarQuery {
    pub symbol: String,
    pub period: HistoryPeriod,
    pub interval: BarInterval,
}

impl BarQuery {
    pub fn daily(symbol: &str, period: HistoryPeriod) -> Self {
        Self {
            symbol: symbol.to_string(),
            period,
            interval: BarInterval::Daily,
        }
    }

    /// The last two sessions of 5-minute bars.
    pub fn intraday(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            period: HistoryPeriod {
                label: "2d".to_string(),
                days: 2,
            },
            interval: BarInterval::FiveMinute,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    NotFound,
    Unavailable(String),
    InvalidData(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::NotFound => write!(f, "not found"),
            FetchError::Unavailable(msg) => write!(f, "unavailable: {msg}"),
            FetchError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

pub trait MarketDataRepository {
    fn load_bars(&self, query: &BarQuery) -> Result<(Vec<PriceBar>, DataQualityReport), FetchError>;
}
