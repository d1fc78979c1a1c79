use std::fmt::Write as _;
use tickerlens_application::analysis::{SymbolAnalysis, SymbolOutcome};
use tickerlens_application::market::MarketReport;
use tickerlens_application::scanning::ScanReport;
use tickerlens_domain::services::levels::LevelSet;

fn price(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

pub fn render_outcome(outcome: &SymbolOutcome) -> String {
    match outcome {
        SymbolOutcome::Ready(analysis) => render_analysis(analysis),
        SymbolOutcome::Unavailable { symbol, reason } => format!("\n[{symbol}] {reason}\n"),
    }
}

fn render_levels(out: &mut String, levels: &LevelSet) {
    if let (Some(low), Some(high)) = (levels.buy_low, levels.buy_high) {
        let _ = writeln!(out, "  entry band   {low:.2} ~ {high:.2}");
    }
    let targets = levels.take_profits();
    if !targets.is_empty() {
        let joined: Vec<String> = targets.iter().map(|v| format!("{v:.2}")).collect();
        let _ = writeln!(out, "  targets      {}", joined.join(" / "));
    }
    let _ = writeln!(
        out,
        "  stops        {} / {}",
        price(levels.sl0),
        price(levels.sl1)
    );
    if let Some(b) = levels.breakout {
        let _ = writeln!(
            out,
            "  breakout     trigger {:.2}, band {:.2} ~ {:.2}, stop {:.2}, target {:.2}",
            b.trigger, b.buy_low, b.buy_high, b.sl0, b.tp1
        );
    }
}

fn render_analysis(a: &SymbolAnalysis) -> String {
    let mut out = String::new();
    let s = &a.snapshot;
    let _ = writeln!(
        out,
        "\n[{}] {} ({} / {}, {} bars)",
        a.symbol,
        a.state_name,
        a.mode.as_str(),
        a.holding.as_str(),
        a.bars
    );
    let _ = writeln!(out, "  action       {}", a.classification.action);
    let _ = writeln!(
        out,
        "  price        {:.2}  (MA5 {:.2} / MA20 {:.2} / MA50 {:.2})",
        a.price, s.ma_short, s.ma_mid, s.ma_long
    );
    let _ = writeln!(
        out,
        "  oscillators  RSI {:.1}, stoch {:.1}/{:.1}, MACD {:.3}/{:.3}, ATR {:.2}",
        s.rsi, s.stoch_k, s.stoch_d, s.macd, s.macd_signal, s.atr
    );
    render_levels(&mut out, &a.levels);
    if let Some(recover) = a.classification.recover_level {
        let _ = writeln!(out, "  recovery     {recover:.2}");
    }
    if let Some(rr) = a.reward_risk {
        let _ = writeln!(out, "  reward/risk  {rr:.2}");
    }
    if let (Some(pct), pnl) = (a.unrealized_pct, a.unrealized_pnl) {
        let _ = writeln!(
            out,
            "  unrealized   {pct:+.2}%{}",
            pnl.map(|v| format!(" ({v:+.2})")).unwrap_or_default()
        );
    }
    let _ = writeln!(
        out,
        "  bias         {} (score {})",
        a.bias.direction.describe(),
        a.bias.score
    );
    if let Some(gap) = a.gap {
        let _ = writeln!(out, "  gap          {:+.2}% {}", gap.pct, gap.kind.describe());
    }
    if !a.volume_profile.is_empty() {
        let bins: Vec<String> = a
            .volume_profile
            .iter()
            .map(|b| format!("{:.2}~{:.2}", b.low, b.high))
            .collect();
        let _ = writeln!(out, "  volume nodes {}", bins.join(", "));
    }
    if !a.heavy_days.is_empty() {
        let days: Vec<String> = a
            .heavy_days
            .iter()
            .map(|d| {
                let date = d.date().map_or_else(|| d.timestamp.to_string(), |d| d.to_string());
                format!("{date} @ {:.2}", d.close)
            })
            .collect();
        let _ = writeln!(out, "  heavy days   {}", days.join(", "));
    }
    if let Some(intraday) = &a.intraday {
        let _ = writeln!(
            out,
            "  intraday     {}/4 {}",
            intraday.score,
            intraday.tone.describe()
        );
    }
    let _ = writeln!(
        out,
        "  market       {} (score {})",
        a.market.mood.as_str(),
        a.market.score
    );
    for alert in &a.alerts {
        let _ = writeln!(out, "  ! {}", alert.message());
    }
    out
}

pub fn render_scan(report: &ScanReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "market: {} (score {})",
        report.market_score.mood.as_str(),
        report.market_score.score
    );
    if report.candidates.is_empty() {
        let _ = writeln!(out, "no candidates near their entry band");
    }
    for (rank, c) in report.candidates.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {:<6} {:>9.2}  band {:.2}~{:.2}  tp1 {:.2}  stop {:.2}  RSI {:.1}  {}  rr {}  score {:.2}",
            rank + 1,
            c.symbol,
            c.price,
            c.buy_low,
            c.buy_high,
            c.tp1,
            c.sl0,
            c.rsi,
            c.bias.describe(),
            price(c.reward_risk),
            c.score
        );
    }
    for skipped in &report.skipped {
        let _ = writeln!(out, "    skipped {}: {}", skipped.symbol, skipped.reason);
    }
    out
}

pub fn render_market(report: &MarketReport) -> String {
    let mut out = String::new();
    if !report.available {
        let _ = writeln!(out, "macro overview unavailable; market treated as neutral");
        return out;
    }
    let _ = writeln!(
        out,
        "macro score {} ({})",
        report.score.score,
        report.score.mood.as_str()
    );
    for detail in &report.score.details {
        let _ = writeln!(out, "  - {detail}");
    }
    if let Some(fgi) = report.fgi {
        let _ = writeln!(out, "fear & greed {fgi:.0}");
    }
    if let Some(sector) = report.sector_score {
        let _ = writeln!(out, "sector score {sector:+.1}");
    }
    if let Some(verdict) = &report.verdict {
        let _ = writeln!(
            out,
            "macro {:.0} / etf {:.0} / index {:.0} / leaders {:.0}",
            verdict.macro_score, verdict.etf, verdict.index, verdict.leader
        );
        for line in &verdict.lines {
            let _ = writeln!(out, "  {line}");
        }
        let _ = writeln!(
            out,
            "=> {}; {}",
            verdict.conclusion.headline(),
            verdict.conclusion.holder_line()
        );
    }
    out
}

pub fn render_validation(report: &serde_json::Value) -> String {
    let mut out = String::new();
    let entries = report["symbols"].as_array().cloned().unwrap_or_default();
    for entry in &entries {
        let symbol = entry["symbol"].as_str().unwrap_or("?");
        if let Some(err) = entry["error"].as_str() {
            let _ = writeln!(out, "{symbol}: {err}");
            continue;
        }
        let q = &entry["ohlcv"];
        let _ = writeln!(
            out,
            "{symbol}: rows={}, duplicates={}, gaps={}, out_of_order={}, invalid_close={}",
            q["rows"], q["duplicates"], q["gaps"], q["out_of_order"], q["invalid_close"]
        );
    }
    out
}
