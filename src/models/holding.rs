use serde::{Deserialize, Serialize};

// Net position in one symbol, derived from the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetHolding {
    pub symbol: String,
    pub shares: i64,
    pub price_per_share: Option<f64>,
    pub value: Option<f64>,
}

impl AssetHolding {
    pub fn unpriced(symbol: String, shares: i64) -> Self {
        Self {
            symbol,
            shares,
            price_per_share: None,
            value: None,
        }
    }

    pub fn priced(symbol: String, shares: i64, price_per_share: f64) -> Self {
        Self {
            symbol,
            shares,
            price_per_share: Some(price_per_share),
            value: Some(price_per_share * shares as f64),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetSummary {
    pub balance: f64,
    pub top_assets: Vec<AssetHolding>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolSearchResult {
    pub symbol: String,
    pub price_per_share: f64,
    pub shares_owned: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockQuote {
    pub symbol: String,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct HoldingsQuery {
    pub limit: Option<usize>,
}
