use crate::value_objects::bar::PriceBar;
use serde::Serialize;

const MA_WINDOW: usize = 20;
const CANDLE_WINDOW: usize = 10;
const VOLUME_WINDOW: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntradayTone {
    BuyersInControl,
    SlightBuyers,
    Balanced,
    SellersOrWait,
}

impl IntradayTone {
    fn from_score(score: u8) -> Self {
        match score {
            3.. => IntradayTone::BuyersInControl,
            2 => IntradayTone::SlightBuyers,
            1 => IntradayTone::Balanced,
            0 => IntradayTone::SellersOrWait,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            IntradayTone::BuyersInControl => "buyers in control intraday",
            IntradayTone::SlightBuyers => "slight buyer edge or mixed",
            IntradayTone::Balanced => "balanced, no clear direction",
            IntradayTone::SellersOrWait => "sellers in control or stand aside",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntradayScore {
    pub score: u8,
    pub tone: IntradayTone,
    pub details: Vec<String>,
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

/// Scores the latest 5-minute bars from 0 to 4: price above the 20-bar average, at least six
/// up candles in the last ten, a volume spike against the median and a higher close than the
/// previous bar.
pub fn intraday_score(bars: &[PriceBar]) -> Option<IntradayScore> {
    let last = bars.last()?;
    let price = last.close;
    let mut score = 0u8;
    let mut details = Vec::new();

    let window = &bars[bars.len().saturating_sub(VOLUME_WINDOW)..];
    let ma_tail = &window[window.len().saturating_sub(MA_WINDOW)..];
    let ma = (ma_tail.len() == MA_WINDOW)
        .then(|| ma_tail.iter().map(|b| b.close).sum::<f64>() / MA_WINDOW as f64);
    match ma {
        Some(ma) if price > ma => {
            score += 1;
            details.push("holding above the 5m 20-bar average".to_string());
        }
        _ => details.push("below the 5m 20-bar average or pulling back".to_string()),
    }

    let candles = &bars[bars.len().saturating_sub(CANDLE_WINDOW)..];
    let up = candles.iter().filter(|b| b.close > b.open).count();
    if up >= 6 {
        score += 1;
        details.push(format!("{up} of the last 10 candles closed up (buyers ahead)"));
    } else {
        details.push(format!("{up} of the last 10 candles closed up"));
    }

    let mut volumes: Vec<f64> = window.iter().map(|b| b.volume).collect();
    match median(&mut volumes) {
        Some(med) if med > 0.0 && last.volume > med * 1.3 => {
            score += 1;
            details.push("5m volume spike".to_string());
        }
        _ => details.push("5m volume is ordinary".to_string()),
    }

    if let [.., prev, _] = bars {
        if price > prev.close {
            score += 1;
            details.push("higher than the previous bar".to_string());
        } else {
            details.push("weaker than the previous bar".to_string());
        }
    }

    Some(IntradayScore {
        score,
        tone: IntradayTone::from_score(score),
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::{intraday_score, IntradayTone};
    use crate::value_objects::bar::PriceBar;

    fn bar(i: i64, open: f64, close: f64, volume: f64) -> PriceBar {
        PriceBar {
            symbol: "TSLA".to_string(),
            timestamp: i * 300,
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume,
        }
    }

    #[test]
    fn rally_scores_full_marks() {
        let mut bars: Vec<PriceBar> = (0..30)
            .map(|i| {
                let base = 100.0 + i as f64 * 0.1;
                bar(i, base, base + 0.05, 1_000.0)
            })
            .collect();
        if let Some(last) = bars.last_mut() {
            last.volume = 5_000.0;
        }
        let score = intraday_score(&bars).expect("score");
        assert_eq!(score.score, 4);
        assert_eq!(score.tone, IntradayTone::BuyersInControl);
        assert_eq!(score.details.len(), 4);
    }

    #[test]
    fn selloff_scores_zero() {
        let bars: Vec<PriceBar> = (0..30)
            .map(|i| {
                let base = 100.0 - i as f64 * 0.1;
                bar(i, base, base - 0.05, 1_000.0)
            })
            .collect();
        let score = intraday_score(&bars).expect("score");
        assert_eq!(score.score, 0);
        assert_eq!(score.tone, IntradayTone::SellersOrWait);
    }

    #[test]
    fn empty_input_has_no_score() {
        assert!(intraday_score(&[]).is_none());
    }
}
