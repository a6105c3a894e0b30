use futures::future::join_all;
use tracing::warn;

use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::models::{MajorIndex, MajorIndexType, StockQuote};
use crate::services::normalize_symbol;

/// Latest quote for one index. A feed with no data, or one that errors, yields
/// a zeroed index so the dashboard still renders.
pub async fn major_index(prices: &dyn PriceProvider, index_type: MajorIndexType) -> MajorIndex {
    match prices.fetch_major_index(index_type).await {
        Ok(Some(index)) => index,
        Ok(None) => {
            warn!("No data for {}, returning empty index", index_type);
            MajorIndex::empty(index_type)
        }
        Err(e) => {
            warn!("Failed to fetch {}: {}", index_type, e);
            MajorIndex::empty(index_type)
        }
    }
}

/// Dow Jones, Nasdaq and S&P 500, fetched concurrently and returned in that
/// order. Never fails; see [`major_index`].
pub async fn major_indexes(prices: &dyn PriceProvider) -> Vec<MajorIndex> {
    join_all(MajorIndexType::ALL.iter().map(|t| major_index(prices, *t))).await
}

/// Current price for `symbol`.
///
/// Invalid symbols are rejected before the feed is called; unknown ones come
/// back as `InvalidSymbol`.
pub async fn quote(prices: &dyn PriceProvider, symbol: &str) -> Result<StockQuote, AppError> {
    let symbol = normalize_symbol(symbol)?;
    let price = prices.fetch_price(&symbol).await?;
    Ok(StockQuote { symbol, price })
}
