use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::FinanceApiConfig;
use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{MajorIndex, MajorIndexType};
use crate::services::rate_limiter::RateLimiter;

pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/api/v3/";

/// Financial Modeling Prep REST client.
pub struct FinancialModelingProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    limiter: RateLimiter,
}

impl FinancialModelingProvider {
    pub fn new(config: &FinanceApiConfig) -> Self {
        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key: config.api_key.clone(),
            limiter: RateLimiter::new(4, config.requests_per_minute),
        }
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, PriceProviderError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let _guard = self.limiter.acquire().await;
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(PriceProviderError::BadResponse(format!("HTTP {}", status)));
        }

        resp.json::<T>()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))
    }
}

// Error bodies arrive with HTTP 200, e.g. { "Error Message": "Limit Reach ..." }
fn check_error_message(message: Option<String>) -> Result<(), PriceProviderError> {
    match message {
        Some(msg) if msg.contains("Limit") => Err(PriceProviderError::RateLimited),
        Some(msg) => Err(PriceProviderError::BadResponse(msg)),
        None => Ok(()),
    }
}

#[derive(Debug, Deserialize)]
struct FmpCompanyPrice {
    symbol: Option<String>,
    price: Option<f64>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

impl FmpCompanyPrice {
    fn into_price(self, requested: &str) -> Result<f64, PriceProviderError> {
        check_error_message(self.error_message)?;
        match (self.symbol, self.price) {
            (Some(_), Some(price)) if price > 0.0 && price.is_finite() => Ok(price),
            _ => Err(PriceProviderError::NotFound(requested.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FmpMajorIndex {
    #[serde(rename = "indexName")]
    index_name: Option<String>,
    price: Option<f64>,
    changes: Option<f64>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

impl FmpMajorIndex {
    fn into_major_index(self, index_type: MajorIndexType) -> Result<Option<MajorIndex>, PriceProviderError> {
        check_error_message(self.error_message)?;
        let Some(price) = self.price else {
            return Ok(None);
        };
        Ok(Some(MajorIndex {
            index_name: self
                .index_name
                .unwrap_or_else(|| index_type.display_name().to_string()),
            price,
            changes: self.changes.unwrap_or(0.0),
            index_type,
        }))
    }
}

#[async_trait]
impl PriceProvider for FinancialModelingProvider {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, PriceProviderError> {
        let body: FmpCompanyPrice = self
            .get_json(&format!("stock/real-time-price/{}", symbol))
            .await?;
        body.into_price(symbol)
    }

    async fn fetch_major_index(
        &self,
        index_type: MajorIndexType,
    ) -> Result<Option<MajorIndex>, PriceProviderError> {
        let body: FmpMajorIndex = self
            .get_json(&format!("majors-indexes/{}", index_type.provider_suffix()))
            .await?;
        let index = body.into_major_index(index_type)?;
        if index.is_none() {
            warn!("No quote returned for {}", index_type);
        }
        Ok(index)
    }
}
