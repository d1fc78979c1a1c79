use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HoldingType {
    NewEntry,
    Holding,
}

impl HoldingType {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "new-entry" | "new_entry" | "new" => Ok(Self::NewEntry),
            "holding" | "hold" | "held" => Ok(Self::Holding),
            _ => Err(format!(
                "unsupported holding type: {value} (expected new-entry | holding)"
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewEntry => "new-entry",
            Self::Holding => "holding",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub holding: HoldingType,
    pub avg_price: Option<f64>,
    pub shares: Option<f64>,
}

impl Position {
    pub fn new_entry() -> Self {
        Self {
            holding: HoldingType::NewEntry,
            avg_price: None,
            shares: None,
        }
    }

    pub fn holding(avg_price: Option<f64>, shares: Option<f64>) -> Self {
        Self {
            holding: HoldingType::Holding,
            avg_price,
            shares,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.holding == HoldingType::Holding
    }

    /// Average entry price, if one was given and is usable. Zero means "not entered".
    pub fn entry_price(&self) -> Option<f64> {
        self.avg_price.filter(|p| p.is_finite() && *p > 0.0)
    }

    pub fn unrealized_pct(&self, price: f64) -> Option<f64> {
        let avg = self.entry_price()?;
        if !price.is_finite() {
            return None;
        }
        Some((price / avg - 1.0) * 100.0)
    }

    pub fn unrealized_pnl(&self, price: f64) -> Option<f64> {
        let avg = self.entry_price()?;
        let shares = self.shares.filter(|s| s.is_finite() && *s > 0.0)?;
        if !price.is_finite() {
            return None;
        }
        Some((price - avg) * shares)
    }
}
