use async_trait::async_trait;
use thiserror::Error;

use crate::models::{MajorIndex, MajorIndexType};

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("symbol not found: {0}")]
    NotFound(String),
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Latest price per share for an upper-cased symbol.
    async fn fetch_price(&self, symbol: &str) -> Result<f64, PriceProviderError>;

    /// `Ok(None)` when the feed has no quote for the index right now.
    async fn fetch_major_index(
        &self,
        index_type: MajorIndexType,
    ) -> Result<Option<MajorIndex>, PriceProviderError>;
}
