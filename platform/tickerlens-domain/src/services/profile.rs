use crate::value_objects::bar::{date_of, PriceBar};
use chrono::NaiveDate;
use serde::Serialize;

const PROFILE_WINDOW: usize = 20;
const PROFILE_MIN_BARS: usize = 5;
const PROFILE_TOP: usize = 3;
const HEAVY_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeBin {
    pub low: f64,
    pub high: f64,
    pub mid: f64,
    pub volume: f64,
}

/// Splits the close range of the last 20 bars into `bins` equal buckets and returns the three
/// buckets with the most volume. Needs at least five bars.
pub fn volume_profile(bars: &[PriceBar], bins: usize) -> Vec<VolumeBin> {
    let recent = &bars[bars.len().saturating_sub(PROFILE_WINDOW)..];
    if recent.len() < PROFILE_MIN_BARS || bins == 0 {
        return Vec::new();
    }

    let (min, max) = recent.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
        (lo.min(b.close), hi.max(b.close))
    });
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }

    let width = (max - min) / bins as f64;
    let mut volumes = vec![0.0; bins];
    let mut hit = vec![false; bins];
    for bar in recent {
        let idx = if width > 0.0 {
            (((bar.close - min) / width).floor() as usize).min(bins - 1)
        } else {
            0
        };
        volumes[idx] += bar.volume;
        hit[idx] = true;
    }

    let mut levels: Vec<VolumeBin> = (0..bins)
        .filter(|i| hit[*i])
        .map(|i| {
            let low = min + width * i as f64;
            let high = low + width;
            VolumeBin {
                low,
                high,
                mid: (low + high) / 2.0,
                volume: volumes[i],
            }
        })
        .collect();
    levels.sort_by(|a, b| b.volume.total_cmp(&a.volume));
    levels.truncate(PROFILE_TOP);
    levels
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeavyDay {
    pub timestamp: i64,
    pub close: f64,
    pub volume: f64,
}

impl HeavyDay {
    pub fn date(&self) -> Option<NaiveDate> {
        date_of(self.timestamp)
    }
}

/// The `n` highest-volume sessions among the last 30 bars, heaviest first.
pub fn heavy_days(bars: &[PriceBar], n: usize) -> Vec<HeavyDay> {
    let recent = &bars[bars.len().saturating_sub(HEAVY_WINDOW)..];
    let mut days: Vec<HeavyDay> = recent
        .iter()
        .map(|b| HeavyDay {
            timestamp: b.timestamp,
            close: b.close,
            volume: b.volume,
        })
        .collect();
    days.sort_by(|a, b| b.volume.total_cmp(&a.volume));
    days.truncate(n);
    days
}
