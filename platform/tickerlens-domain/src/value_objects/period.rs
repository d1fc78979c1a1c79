use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPeriod {
    pub label: String,
    pub days: i64,
}

impl HistoryPeriod {
    pub fn parse(value: &str) -> Result<Self, String> {
        let normalized = value.trim().to_lowercase();
        let (label, days) = match normalized.as_str() {
            "5d" => ("5d", 5),
            "1mo" => ("1mo", 31),
            "3mo" => ("3mo", 92),
            "6mo" => ("6mo", 183),
            "1y" => ("1y", 366),
            "2y" => ("2y", 731),
            _ => return Err(format!("unsupported history period: {value}")),
        };
        Ok(Self {
            label: label.to_string(),
            days,
        })
    }

    pub fn seconds(&self) -> i64 {
        self.days * 86_400
    }
}
