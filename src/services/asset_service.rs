use futures::future::try_join_all;
use tracing::debug;

use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::models::{Account, AssetHolding, AssetSummary, SymbolSearchResult};
use crate::services::normalize_symbol;

const SUMMARY_SIZE: usize = 3;

/// Open positions, largest share count first. Fully sold symbols are left out.
pub fn holdings(account: &Account, limit: Option<usize>) -> Vec<AssetHolding> {
    let mut holdings: Vec<AssetHolding> = account
        .net_shares_by_symbol()
        .into_iter()
        .filter(|(_, shares)| *shares > 0)
        .map(|(symbol, shares)| AssetHolding::unpriced(symbol, shares))
        .collect();

    // BTreeMap order already breaks ties by symbol; the sort is stable.
    holdings.sort_by(|a, b| b.shares.cmp(&a.shares));
    if let Some(limit) = limit {
        holdings.truncate(limit);
    }
    holdings
}

/// Open positions priced at the current quote, most valuable first.
pub async fn holdings_by_value(
    prices: &dyn PriceProvider,
    account: &Account,
    limit: Option<usize>,
) -> Result<Vec<AssetHolding>, AppError> {
    let open = holdings(account, None);
    let quotes = try_join_all(open.iter().map(|h| prices.fetch_price(&h.symbol))).await?;

    let mut priced: Vec<AssetHolding> = open
        .into_iter()
        .zip(quotes)
        .map(|(h, price)| AssetHolding::priced(h.symbol, h.shares, price))
        .collect();
    priced.sort_by(|a, b| {
        let (a_value, b_value) = (a.value.unwrap_or(0.0), b.value.unwrap_or(0.0));
        b_value.total_cmp(&a_value).then_with(|| a.symbol.cmp(&b.symbol))
    });
    if let Some(limit) = limit {
        priced.truncate(limit);
    }
    debug!("Priced {} holdings for account {}", priced.len(), account.id);
    Ok(priced)
}

/// Net shares of `symbol` the account holds; zero when it never traded it.
///
/// The symbol is normalized first, so `" msft"` and `"MSFT"` agree.
pub fn shares_owned(account: &Account, symbol: &str) -> Result<i64, AppError> {
    let symbol = normalize_symbol(symbol)?;
    Ok(account.shares_owned(&symbol))
}

/// Current price for `symbol` together with how many shares the account holds.
pub async fn search_symbol(
    prices: &dyn PriceProvider,
    account: &Account,
    symbol: &str,
) -> Result<SymbolSearchResult, AppError> {
    let symbol = normalize_symbol(symbol)?;
    let price_per_share = prices.fetch_price(&symbol).await?;
    let shares_owned = account.shares_owned(&symbol);

    Ok(SymbolSearchResult {
        symbol,
        price_per_share,
        shares_owned,
    })
}

/// Cash balance plus the three largest open positions by share count.
///
/// Unpriced, so it never touches the price feed.
pub fn summary(account: &Account) -> AssetSummary {
    AssetSummary {
        balance: account.balance,
        top_assets: holdings(account, Some(SUMMARY_SIZE)),
    }
}
