use crate::value_objects::bar::PriceBar;
use crate::value_objects::period::HistoryPeriod;
use serde::Serialize;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct DataQualityReport {
    pub bars: usize,
    pub duplicates: usize,
    pub gaps: usize,
    pub out_of_order: usize,
    pub invalid_close: usize,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
    pub first_gap: Option<i64>,
    pub first_duplicate: Option<i64>,
    pub first_out_of_order: Option<i64>,
    pub first_invalid_close: Option<i64>,
    pub max_gap_seconds: Option<i64>,
}

impl DataQualityReport {
    /// Problems that make the series unusable under `validate --strict`. Gaps are excluded
    /// since daily data always skips weekends and holidays.
    pub fn strict_issues(&self) -> usize {
        self.duplicates + self.out_of_order + self.invalid_close
    }

    pub fn is_clean(&self) -> bool {
        self.strict_issues() == 0
    }
}

/// Scans `bars` for duplicated, out-of-order, gapped and non-positive/non-finite closes.
///
/// `max_step_seconds` is the largest spacing that still counts as contiguous.
pub fn data_quality_from_bars(bars: &[PriceBar], max_step_seconds: Option<i64>) -> DataQualityReport {
    let mut report = DataQualityReport {
        bars: bars.len(),
        ..DataQualityReport::default()
    };
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return report;
    };

    let step = max_step_seconds.unwrap_or(1).max(1);
    report.first_timestamp = Some(first.timestamp);
    report.last_timestamp = Some(last.timestamp);

    let mut last_ts: Option<i64> = None;
    let mut max_gap: Option<i64> = None;

    for bar in bars {
        let ts = bar.timestamp;

        if !bar.close.is_finite() || bar.close <= 0.0 {
            report.invalid_close += 1;
            if report.first_invalid_close.is_none() {
                report.first_invalid_close = Some(ts);
            }
        }

        if let Some(prev) = last_ts {
            if ts == prev {
                report.duplicates += 1;
                if report.first_duplicate.is_none() {
                    report.first_duplicate = Some(ts);
                }
            } else if ts < prev {
                report.out_of_order += 1;
                if report.first_out_of_order.is_none() {
                    report.first_out_of_order = Some(ts);
                }
            } else {
                let diff = ts - prev;
                if diff > step {
                    report.gaps += 1;
                    if report.first_gap.is_none() {
                        report.first_gap = Some(ts);
                    }
                    max_gap = Some(max_gap.map_or(diff, |current| current.max(diff)));
                }
            }
        }

        last_ts = Some(ts);
    }

    report.max_gap_seconds = max_gap;
    report
}

/// Keeps the bars that fall inside `period`, measured back from the newest bar.
pub fn trim_to_period(bars: Vec<PriceBar>, period: &HistoryPeriod) -> Vec<PriceBar> {
    let Some(newest) = bars.iter().map(|b| b.timestamp).max() else {
        return bars;
    };
    let cutoff = newest.saturating_sub(period.seconds());
    bars.into_iter().filter(|b| b.timestamp > cutoff).collect()
}

/// Sorts by timestamp and drops duplicates (the later row wins) and rows without a usable close.
pub fn sanitize_bars(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.retain(|b| b.is_finite() && b.close > 0.0);
    bars.sort_by_key(|b| b.timestamp);
    let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(prev) if prev.timestamp == bar.timestamp => *prev = bar,
            _ => out.push(bar),
        }
    }
    out
}
