use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quote {
    pub last: Option<f64>,
    pub chg_pct: Option<f64>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexPair {
    pub nasdaq: Quote,
    pub sp500: Quote,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesFx {
    /// 10-year yield in percent.
    pub us10y: Option<f64>,
    /// 10-year yield change in basis points.
    pub us10y_bp: Option<f64>,
    pub dxy: Option<f64>,
    pub dxy_chg: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerChange {
    pub symbol: String,
    pub name: Option<String>,
    pub last: Option<f64>,
    pub chg_pct: Option<f64>,
    pub market_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layer {
    pub items: Vec<TickerChange>,
    pub score: Option<f64>,
}

impl Layer {
    /// Supplied score, or one derived from the member changes (+1 at >= 0.5%, +0.5 at >= 0%,
    /// -1 at <= -1%).
    pub fn effective_score(&self, strong: f64) -> f64 {
        if let Some(score) = self.score.filter(|s| s.is_finite()) {
            return score;
        }
        self.items
            .iter()
            .filter_map(|i| i.chg_pct)
            .map(|chg| {
                if chg >= 0.5 {
                    strong
                } else if chg >= 0.0 {
                    0.5
                } else if chg <= -1.0 {
                    -strong
                } else {
                    0.0
                }
            })
            .sum()
    }
}

/// Snapshot of futures, rates, dollar, sentiment, index, ETF and mega-cap moves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroOverview {
    pub futures: IndexPair,
    pub rates_fx: RatesFx,
    pub fgi: Option<f64>,
    pub indexes: IndexPair,
    pub etfs: Vec<TickerChange>,
    pub bigtech: Layer,
    pub sector: Layer,
}

impl MacroOverview {
    fn etf_average(&self) -> Option<f64> {
        mean(self.etfs.iter().filter_map(|e| e.chg_pct))
    }

    fn bigtech_score(&self) -> f64 {
        self.bigtech.effective_score(1.0)
    }

    pub fn sector_score(&self) -> f64 {
        self.sector.effective_score(0.8)
    }

    /// Trading session as reported by the first ETF that carries one.
    pub fn session(&self) -> MarketSession {
        let state = self
            .etfs
            .iter()
            .filter_map(|e| e.market_state.as_deref())
            .map(str::trim)
            .find(|s| !s.is_empty());
        match state {
            Some("PRE") => MarketSession::PreMarket,
            Some("POST") => MarketSession::AfterHours,
            Some("REGULAR") => MarketSession::Regular,
            Some(other) => MarketSession::Other(other.to_string()),
            None => MarketSession::Unknown,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketSession {
    PreMarket,
    Regular,
    AfterHours,
    Other(String),
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketMood {
    Favorable,
    Neutral,
    Cautious,
}

impl MarketMood {
    fn from_score(score: i32) -> Self {
        if score >= 3 {
            MarketMood::Favorable
        } else if score >= -1 {
            MarketMood::Neutral
        } else {
            MarketMood::Cautious
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketMood::Favorable => "favorable",
            MarketMood::Neutral => "neutral",
            MarketMood::Cautious => "cautious",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketScore {
    pub score: i32,
    pub mood: MarketMood,
    pub details: Vec<String>,
}

impl MarketScore {
    pub fn neutral() -> Self {
        Self {
            score: 0,
            mood: MarketMood::Neutral,
            details: Vec::new(),
        }
    }
}

fn tiered(value: f64, up: [(f64, i32); 2], down: [(f64, i32); 2]) -> i32 {
    for (threshold, points) in up {
        if value >= threshold {
            return points;
        }
    }
    for (threshold, points) in down {
        if value <= threshold {
            return points;
        }
    }
    0
}

/// Coarse macro score in roughly -8..=8 built from futures, rates, dollar, ETF and mega-cap moves.
pub fn market_score(overview: &MacroOverview) -> MarketScore {
    let mut score = 0;
    let mut details = Vec::new();

    for (name, quote) in [
        ("nasdaq", &overview.futures.nasdaq),
        ("sp500", &overview.futures.sp500),
    ] {
        if let Some(chg) = quote.chg_pct {
            let points = tiered(chg, [(0.7, 2), (0.2, 1)], [(-1.0, -2), (-0.5, -1)]);
            if points != 0 {
                score += points;
                details.push(format!("futures({name}) {points:+}"));
            }
        }
    }

    if let Some(bp) = overview.rates_fx.us10y_bp {
        if bp > 4.0 {
            score -= 1;
            details.push("10y yield rising (-1)".to_string());
        } else if bp < -4.0 {
            score += 1;
            details.push("10y yield falling (+1)".to_string());
        }
    }

    if let Some(dxy) = overview.rates_fx.dxy_chg {
        if dxy > 0.2 {
            score -= 1;
            details.push("dollar strength (-1)".to_string());
        } else if dxy < -0.2 {
            score += 1;
            details.push("dollar weakness (+1)".to_string());
        }
    }

    if let Some(avg) = overview.etf_average() {
        let points = tiered(avg, [(1.0, 2), (0.3, 1)], [(-1.0, -2), (-0.3, -1)]);
        if points != 0 {
            score += points;
            details.push(format!("leading ETFs ({points:+})"));
        }
    }

    let bt = overview.bigtech_score();
    let points = if bt >= 3.0 {
        2
    } else if bt >= 1.0 {
        1
    } else if bt <= -3.0 {
        -2
    } else {
        0
    };
    if points != 0 {
        score += points;
        details.push(format!("mega-caps ({points:+})"));
    }

    MarketScore {
        score,
        mood: MarketMood::from_score(score),
        details,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    EntryUnfavorable,
    EntryCautious,
    EntryPossible,
    Selective,
}

impl Conclusion {
    pub fn headline(&self) -> &'static str {
        match self {
            Conclusion::EntryUnfavorable => "new entries unfavorable",
            Conclusion::EntryCautious => "new entries: be careful",
            Conclusion::EntryPossible => "new entries possible",
            Conclusion::Selective => "selective approach",
        }
    }

    pub fn holder_line(&self) -> &'static str {
        match self {
            Conclusion::EntryUnfavorable => "holders: stay defensive",
            Conclusion::EntryCautious => "holders: trade only the short-term bounce",
            Conclusion::EntryPossible => "holders: can follow the trend",
            Conclusion::Selective => "holders: scale in and out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketVerdict {
    pub macro_score: f64,
    pub etf: f64,
    pub index: f64,
    pub leader: f64,
    pub lines: Vec<String>,
    pub conclusion: Conclusion,
}

fn clamp_pct(x: f64) -> f64 {
    x.clamp(0.0, 100.0)
}

fn score_to_text(score: f64) -> &'static str {
    if score >= 65.0 {
        "positive"
    } else if score >= 55.0 {
        "gradually improving"
    } else if score >= 45.0 {
        "neutral"
    } else if score >= 35.0 {
        "needs caution"
    } else {
        "warning"
    }
}

/// Rescales the macro score and the ETF, index and mega-cap layers onto 0..=100 and draws a
/// conclusion for new entries and holders.
pub fn market_verdict(overview: &MacroOverview, bigtech_count: usize) -> MarketVerdict {
    let macro_score = clamp_pct((market_score(overview).score as f64 + 8.0) / 16.0 * 100.0);

    let etf = overview
        .etf_average()
        .map_or(50.0, |avg| clamp_pct(50.0 + avg * 20.0));

    let index_avg = mean(
        [overview.indexes.nasdaq.chg_pct, overview.indexes.sp500.chg_pct]
            .into_iter()
            .flatten(),
    );
    let index = match (index_avg, overview.futures.nasdaq.chg_pct) {
        (Some(avg), _) => clamp_pct(50.0 + avg * 20.0),
        (None, Some(fut)) => clamp_pct(50.0 + fut * 18.0),
        (None, None) => 50.0,
    };

    let n = bigtech_count.max(1) as f64;
    let leader = clamp_pct(50.0 + overview.bigtech_score() / n * 30.0);

    let etf_text = if etf >= 65.0 {
        format!("{} (confirm in regular session)", score_to_text(etf))
    } else if etf < 50.0 {
        format!("{} (risk watch)", score_to_text(etf))
    } else {
        format!("{} (waiting)", score_to_text(etf))
    };
    let index_text = if (52.0..60.0).contains(&index) {
        "rebound attempt, trend unstable"
    } else if (45.0..52.0).contains(&index) {
        "trend unstable"
    } else {
        score_to_text(index)
    };
    let leader_text = if leader >= 68.0 {
        "clear leadership"
    } else if leader >= 58.0 {
        "stretched at the top"
    } else if leader >= 52.0 {
        "lacking strength"
    } else {
        "leadership lost"
    };

    let conclusion = if macro_score < 45.0 {
        Conclusion::EntryUnfavorable
    } else if index < 52.0 || leader < 52.0 {
        Conclusion::EntryCautious
    } else if macro_score >= 60.0 && index >= 60.0 && leader >= 58.0 {
        Conclusion::EntryPossible
    } else {
        Conclusion::Selective
    };

    MarketVerdict {
        macro_score,
        etf,
        index,
        leader,
        lines: vec![
            format!("macro: {}", score_to_text(macro_score)),
            format!("leading ETFs: {etf_text}"),
            format!("indexes: {index_text}"),
            format!("mega-caps: {leader_text}"),
        ],
        conclusion,
    }
}

#[cfg(test)]
mod tests {
    use super::{market_score, market_verdict, Conclusion, MacroOverview, MarketMood, MarketSession};

    fn overview(json: &str) -> MacroOverview {
        serde_json::from_str(json).expect("overview json")
    }

    #[test]
    fn empty_overview_is_neutral() {
        let out = market_score(&MacroOverview::default());
        assert_eq!(out.score, 0);
        assert_eq!(out.mood, MarketMood::Neutral);
        let verdict = market_verdict(&MacroOverview::default(), 7);
        assert_eq!(verdict.macro_score, 50.0);
        assert_eq!(verdict.index, 50.0);
        assert_eq!(verdict.conclusion, Conclusion::EntryCautious);
    }

    #[test]
    fn risk_on_day_scores_high() {
        let ov = overview(
            r#"{
                "futures": {"nasdaq": {"chg_pct": 1.1}, "sp500": {"chg_pct": 0.4}},
                "rates_fx": {"us10y": 4.1, "us10y_bp": -5.0, "dxy": 103.0, "dxy_chg": -0.3},
                "fgi": 62.0,
                "indexes": {"nasdaq": {"chg_pct": 0.9}, "sp500": {"chg_pct": 0.6}},
                "etfs": [
                    {"symbol": "QQQ", "chg_pct": 1.2, "market_state": "PRE"},
                    {"symbol": "VOO", "chg_pct": 0.9}
                ],
                "bigtech": {"score": 4.5}
            }"#,
        );
        let out = market_score(&ov);
        assert_eq!(out.score, 2 + 1 + 1 + 1 + 2 + 2);
        assert_eq!(out.mood, MarketMood::Favorable);
        assert_eq!(ov.session(), MarketSession::PreMarket);

        let verdict = market_verdict(&ov, 7);
        assert_eq!(verdict.conclusion, Conclusion::EntryPossible);
        assert_eq!(verdict.lines.len(), 4);
    }

    #[test]
    fn bigtech_score_is_derived_from_items_when_missing() {
        let ov = overview(
            r#"{"bigtech": {"items": [
                {"symbol": "NVDA", "chg_pct": -2.0},
                {"symbol": "AAPL", "chg_pct": -1.5},
                {"symbol": "MSFT", "chg_pct": -1.1}
            ]}}"#,
        );
        let out = market_score(&ov);
        assert_eq!(out.score, -2);
        assert_eq!(out.mood, MarketMood::Cautious);
    }
}
