use async_trait::async_trait;
use tracing::{info, warn};

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{MajorIndex, MajorIndexType};
use crate::services::failure_cache::{FailureCache, FailureType};

/// Wraps a provider and remembers symbols that recently failed, answering
/// repeat lookups from the cache instead of the network.
pub struct FailureAwareProvider {
    inner: Box<dyn PriceProvider>,
    failures: FailureCache,
}

impl FailureAwareProvider {
    pub fn new(inner: Box<dyn PriceProvider>, failures: FailureCache) -> Self {
        Self { inner, failures }
    }
}

#[async_trait]
impl PriceProvider for FailureAwareProvider {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, PriceProviderError> {
        if let Some(failure) = self.failures.is_failed(symbol) {
            info!(
                "Skipping provider call for {} ({:?} at {})",
                symbol, failure.failure_type, failure.failed_at
            );
            return Err(match failure.failure_type {
                FailureType::NotFound => PriceProviderError::NotFound(symbol.to_string()),
                FailureType::RateLimited => PriceProviderError::RateLimited,
            });
        }

        match self.inner.fetch_price(symbol).await {
            Ok(price) => {
                self.failures.clear(symbol);
                Ok(price)
            }
            Err(e) => {
                match &e {
                    PriceProviderError::NotFound(_) => {
                        self.failures.record_failure(symbol, FailureType::NotFound)
                    }
                    PriceProviderError::RateLimited => {
                        self.failures.record_failure(symbol, FailureType::RateLimited)
                    }
                    other => warn!("Price lookup for {} failed: {}", symbol, other),
                }
                Err(e)
            }
        }
    }

    async fn fetch_major_index(
        &self,
        index_type: MajorIndexType,
    ) -> Result<Option<MajorIndex>, PriceProviderError> {
        self.inner.fetch_major_index(index_type).await
    }
}
