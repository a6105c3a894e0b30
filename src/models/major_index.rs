use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MajorIndexType {
    DowJones,
    Nasdaq,
    SP500,
}

impl MajorIndexType {
    pub const ALL: [MajorIndexType; 3] = [MajorIndexType::DowJones, MajorIndexType::Nasdaq, MajorIndexType::SP500];

    /// Ticker suffix used by the market data provider.
    pub fn provider_suffix(self) -> &'static str {
        match self {
            MajorIndexType::DowJones => ".DJI",
            MajorIndexType::Nasdaq => ".IXIC",
            MajorIndexType::SP500 => ".INX",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MajorIndexType::DowJones => "Dow Jones",
            MajorIndexType::Nasdaq => "Nasdaq",
            MajorIndexType::SP500 => "S&P 500",
        }
    }
}

impl fmt::Display for MajorIndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for MajorIndexType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' ', '&'], "").as_str() {
            "dowjones" | "dji" | ".dji" => Ok(MajorIndexType::DowJones),
            "nasdaq" | "ixic" | ".ixic" => Ok(MajorIndexType::Nasdaq),
            "sp500" | "sandp500" | "inx" | ".inx" => Ok(MajorIndexType::SP500),
            other => Err(format!("Unknown major index: {}", other)),
        }
    }
}

// Read-only quote for one of the major market indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MajorIndex {
    pub index_name: String,
    pub price: f64,
    pub changes: f64,
    pub index_type: MajorIndexType,
}

impl MajorIndex {
    /// Placeholder shown when the provider has nothing for an index.
    pub fn empty(index_type: MajorIndexType) -> Self {
        Self {
            index_name: index_type.display_name().to_string(),
            price: 0.0,
            changes: 0.0,
            index_type,
        }
    }
}
