use crate::config::Config;
use crate::shared::bigtech_symbols;
use serde::Serialize;
use tickerlens_domain::repositories::macro_data::MacroRepository;
use tickerlens_domain::services::macro_score::{
    market_score, market_verdict, MarketScore, MarketSession, MarketVerdict,
};
use tracing::{info_span, warn};

#[derive(Debug, Clone, Serialize)]
pub struct MarketReport {
    pub available: bool,
    pub score: MarketScore,
    pub verdict: Option<MarketVerdict>,
    pub fgi: Option<f64>,
    pub session: MarketSession,
    pub sector_score: Option<f64>,
}

impl MarketReport {
    fn unavailable() -> Self {
        Self {
            available: false,
            score: MarketScore::neutral(),
            verdict: None,
            fgi: None,
            session: MarketSession::Unknown,
            sector_score: None,
        }
    }
}

/// Macro score, verdict and sentiment reading. A missing or failing overview source yields an
/// unavailable report with a neutral score.
pub fn market_overview(config: &Config, macro_data: Option<&dyn MacroRepository>) -> MarketReport {
    let _span = info_span!("market_overview").entered();
    metrics::counter!("tickerlens.market.requests").increment(1);

    let Some(repo) = macro_data else {
        warn!("no macro overview source configured");
        return MarketReport::unavailable();
    };
    let overview = match repo.load_overview() {
        Ok(overview) => overview,
        Err(err) => {
            warn!(error = %err, "macro overview unavailable");
            return MarketReport::unavailable();
        }
    };

    let score = market_score(&overview);
    metrics::gauge!("tickerlens.market.score").set(score.score as f64);
    let verdict = market_verdict(&overview, bigtech_symbols(config).len());
    let sector_score = (!overview.sector.items.is_empty() || overview.sector.score.is_some())
        .then(|| overview.sector_score());

    MarketReport {
        available: true,
        score,
        verdict: Some(verdict),
        fgi: overview.fgi.filter(|v| v.is_finite()),
        session: overview.session(),
        sector_score,
    }
}
