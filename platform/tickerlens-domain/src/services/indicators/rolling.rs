use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RollingSma {
    window: usize,
    buf: VecDeque<f64>,
    sum: f64,
}

impl RollingSma {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            buf: VecDeque::new(),
            sum: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.window == 0 {
            return None;
        }

        self.buf.push_back(value);
        self.sum += value;
        while self.buf.len() > self.window {
            if let Some(front) = self.buf.pop_front() {
                self.sum -= front;
            }
        }

        if self.buf.len() == self.window {
            Some(self.sum / self.window as f64)
        } else {
            None
        }
    }
}

/// Sample standard deviation (n - 1) over a fixed window.
#[derive(Debug, Clone)]
pub struct RollingStd {
    window: usize,
    buf: VecDeque<f64>,
}

impl RollingStd {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            buf: VecDeque::new(),
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.window < 2 {
            return None;
        }

        self.buf.push_back(value);
        while self.buf.len() > self.window {
            self.buf.pop_front();
        }
        if self.buf.len() < self.window {
            return None;
        }

        let n = self.window as f64;
        let mean = self.buf.iter().sum::<f64>() / n;
        let ss: f64 = self.buf.iter().map(|v| (v - mean) * (v - mean)).sum();
        Some((ss / (n - 1.0)).max(0.0).sqrt())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Min,
    Max,
}

#[derive(Debug, Clone)]
pub struct RollingExtreme {
    window: usize,
    kind: Extreme,
    buf: VecDeque<f64>,
}

impl RollingExtreme {
    pub fn new(window: usize, kind: Extreme) -> Self {
        Self {
            window,
            kind,
            buf: VecDeque::new(),
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.window == 0 {
            return None;
        }

        self.buf.push_back(value);
        while self.buf.len() > self.window {
            self.buf.pop_front();
        }
        if self.buf.len() < self.window {
            return None;
        }

        let values = self.buf.iter().copied();
        Some(match self.kind {
            Extreme::Min => values.fold(f64::INFINITY, f64::min),
            Extreme::Max => values.fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Recursive EMA seeded with the first observation (`alpha = 2 / (span + 1)`).
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
    value: Option<f64>,
}

impl Ema {
    pub fn with_span(span: usize) -> Self {
        Self {
            alpha: 2.0 / (span.max(1) as f64 + 1.0),
            value: None,
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        let next = match self.value {
            Some(prev) => prev + self.alpha * (value - prev),
            None => value,
        };
        self.value = Some(next);
        self.value
    }
}

/// RSI with Wilder smoothing (`alpha = 1 / window`), seeded with the first close-to-close change.
///
/// Emits only after `window` changes have been seen. A window with no losses reads 100,
/// one with neither gains nor losses reads 50.
#[derive(Debug, Clone)]
pub struct WilderRsi {
    window: usize,
    prev_close: Option<f64>,
    avg_gain: f64,
    avg_loss: f64,
    seen: usize,
}

impl WilderRsi {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            prev_close: None,
            avg_gain: 0.0,
            avg_loss: 0.0,
            seen: 0,
        }
    }

    pub fn update(&mut self, close: f64) -> Option<f64> {
        if self.window == 0 {
            return None;
        }

        let Some(prev) = self.prev_close else {
            self.prev_close = Some(close);
            return None;
        };
        self.prev_close = Some(close);

        let diff = close - prev;
        let gain = diff.max(0.0);
        let loss = (-diff).max(0.0);

        if self.seen == 0 {
            self.avg_gain = gain;
            self.avg_loss = loss;
        } else {
            let alpha = 1.0 / self.window as f64;
            self.avg_gain += alpha * (gain - self.avg_gain);
            self.avg_loss += alpha * (loss - self.avg_loss);
        }
        self.seen += 1;

        if self.seen < self.window {
            return None;
        }

        Some(rsi_from_averages(self.avg_gain, self.avg_loss))
    }
}

pub(crate) fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return if avg_gain > 0.0 { 100.0 } else { 50.0 };
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

#[derive(Debug, Clone)]
pub struct RollingAtr {
    prev_close: Option<f64>,
    mean: RollingSma,
}

impl RollingAtr {
    pub fn new(window: usize) -> Self {
        Self {
            prev_close: None,
            mean: RollingSma::new(window),
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) -> Option<f64> {
        let span = high - low;
        let tr = match self.prev_close {
            Some(prev) => span.max((high - prev).abs()).max((low - prev).abs()),
            None => span,
        };
        self.prev_close = Some(close);
        self.mean.update(tr)
    }
}

#[cfg(test)]
mod tests {
    use super::{rsi_from_averages, Ema, Extreme, RollingExtreme, RollingStd, WilderRsi};

    #[test]
    fn rolling_std_uses_sample_denominator() {
        let mut std = RollingStd::new(4);
        let mut last = None;
        for v in [2.0, 4.0, 4.0, 6.0] {
            last = std.update(v);
        }
        // mean 4, squared deviations 4+0+0+4 = 8, 8 / 3
        let expected = (8.0f64 / 3.0).sqrt();
        assert!((last.expect("std") - expected).abs() < 1e-12);
    }

    #[test]
    fn rolling_extreme_tracks_window() {
        let mut max = RollingExtreme::new(3, Extreme::Max);
        let mut min = RollingExtreme::new(3, Extreme::Min);
        let mut out = Vec::new();
        for v in [5.0, 1.0, 3.0, 2.0, 0.5] {
            out.push((max.update(v), min.update(v)));
        }
        assert_eq!(out[1], (None, None));
        assert_eq!(out[2], (Some(5.0), Some(1.0)));
        assert_eq!(out[3], (Some(3.0), Some(1.0)));
        assert_eq!(out[4], (Some(3.0), Some(0.5)));
    }

    #[test]
    fn ema_is_seeded_with_first_value() {
        let mut ema = Ema::with_span(3);
        assert_eq!(ema.update(10.0), Some(10.0));
        let next = ema.update(20.0).expect("ema");
        assert!((next - 15.0).abs() < 1e-12);
    }

    #[test]
    fn rsi_saturates_without_losses() {
        let mut rsi = WilderRsi::new(14);
        let mut last = None;
        for i in 0..30 {
            last = rsi.update(100.0 + i as f64);
        }
        assert_eq!(last, Some(100.0));
    }

    #[test]
    fn rsi_flat_series_reads_fifty() {
        let mut rsi = WilderRsi::new(14);
        let mut last = None;
        for _ in 0..30 {
            last = rsi.update(100.0);
        }
        assert_eq!(last, Some(50.0));
    }

    #[test]
    fn rsi_waits_for_full_window() {
        let mut rsi = WilderRsi::new(3);
        assert_eq!(rsi.update(1.0), None);
        assert_eq!(rsi.update(2.0), None);
        assert_eq!(rsi.update(1.5), None);
        assert!(rsi.update(2.5).is_some());
    }

    #[test]
    fn rsi_from_averages_is_bounded() {
        assert_eq!(rsi_from_averages(0.0, 1.0), 0.0);
        assert_eq!(rsi_from_averages(1.0, 0.0), 100.0);
        assert!((rsi_from_averages(1.0, 1.0) - 50.0).abs() < 1e-12);
    }
}
