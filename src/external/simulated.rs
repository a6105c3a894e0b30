use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{MajorIndex, MajorIndexType};

const DEFAULT_PRICES: [(&str, f64); 8] = [
    ("AAPL", 190.0),
    ("AMZN", 180.0),
    ("GOOGL", 160.0),
    ("META", 480.0),
    ("MSFT", 410.0),
    ("NFLX", 620.0),
    ("NVDA", 880.0),
    ("TSLA", 175.0),
];

fn default_index_level(index_type: MajorIndexType) -> f64 {
    match index_type {
        MajorIndexType::DowJones => 38_500.0,
        MajorIndexType::Nasdaq => 16_000.0,
        MajorIndexType::SP500 => 5_100.0,
    }
}

/// Offline market feed: every quote takes a bounded random step from the last
/// one. With zero volatility prices never move.
pub struct SimulatedProvider {
    prices: Mutex<HashMap<String, f64>>,
    indexes: Mutex<HashMap<MajorIndexType, f64>>,
    volatility: f64,
}

impl SimulatedProvider {
    pub fn new<I, S>(prices: I, volatility: f64) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let prices = prices
            .into_iter()
            .map(|(symbol, price)| (symbol.into().to_uppercase(), price))
            .collect();
        let indexes = MajorIndexType::ALL
            .iter()
            .map(|t| (*t, default_index_level(*t)))
            .collect();

        Self {
            prices: Mutex::new(prices),
            indexes: Mutex::new(indexes),
            volatility: volatility.abs().min(0.5),
        }
    }

    pub fn with_default_universe(volatility: f64) -> Self {
        Self::new(DEFAULT_PRICES, volatility)
    }

    /// Fixed prices, for deterministic runs.
    pub fn fixed<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self::new(prices, 0.0)
    }

    fn step(&self, last: f64) -> f64 {
        if self.volatility == 0.0 {
            return last;
        }
        let pct = rand::rng().random_range(-self.volatility..=self.volatility);
        (last * (1.0 + pct) * 100.0).round() / 100.0
    }
}

#[async_trait]
impl PriceProvider for SimulatedProvider {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, PriceProviderError> {
        let mut prices = self.prices.lock();
        let last = prices
            .get_mut(symbol)
            .ok_or_else(|| PriceProviderError::NotFound(symbol.to_string()))?;
        let next = self.step(*last).max(0.01);
        *last = next;
        Ok(next)
    }

    async fn fetch_major_index(
        &self,
        index_type: MajorIndexType,
    ) -> Result<Option<MajorIndex>, PriceProviderError> {
        let mut indexes = self.indexes.lock();
        let Some(last) = indexes.get_mut(&index_type) else {
            return Ok(None);
        };
        let previous = *last;
        let next = self.step(previous);
        *last = next;

        Ok(Some(MajorIndex {
            index_name: index_type.display_name().to_string(),
            price: next,
            changes: ((next - previous) * 100.0).round() / 100.0,
            index_type,
        }))
    }
}
