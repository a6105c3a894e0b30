use tracing::{info, warn};

use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::models::{Account, AssetTransaction};
use crate::services::normalize_symbol;
use crate::store::AccountRepository;

fn validate_shares(shares: i64) -> Result<(), AppError> {
    if shares <= 0 {
        return Err(AppError::Validation("Shares must be greater than 0".into()));
    }
    Ok(())
}

async fn persist(repo: &dyn AccountRepository, account: &Account) -> Result<Account, AppError> {
    repo.update(account).await?.ok_or_else(|| {
        warn!("Account {} vanished before the trade was stored", account.id);
        AppError::TransactionFailed
    })
}

/// Debits `shares * price` from the buyer and records the purchase.
///
/// The balance may reach exactly zero but never go below it.
pub async fn buy_stock(
    repo: &dyn AccountRepository,
    prices: &dyn PriceProvider,
    buyer: &Account,
    symbol: &str,
    shares: i64,
) -> Result<Account, AppError> {
    let symbol = normalize_symbol(symbol)?;
    validate_shares(shares)?;
    if buyer.shares_owned(&symbol).checked_add(shares).is_none() {
        return Err(AppError::Validation(format!("Position in {} would exceed the share limit", symbol)));
    }

    let price = prices.fetch_price(&symbol).await?;
    let required = price * shares as f64;
    let remaining = buyer.balance - required;
    if remaining < 0.0 {
        return Err(AppError::InsufficientBalance {
            balance: buyer.balance,
            required,
        });
    }

    let mut account = buyer.clone();
    account.balance = remaining;
    account
        .asset_transactions
        .push(AssetTransaction::purchase(account.id, &symbol, price, shares));

    let stored = persist(repo, &account).await?;
    info!(
        "Account {} bought {} {} at {:.2}, balance now {:.2}",
        stored.id, shares, symbol, price, stored.balance
    );
    Ok(stored)
}

/// Credits `shares * price` to the seller and records the sale. Ownership is
/// checked before the price is fetched.
pub async fn sell_stock(
    repo: &dyn AccountRepository,
    prices: &dyn PriceProvider,
    seller: &Account,
    symbol: &str,
    shares: i64,
) -> Result<Account, AppError> {
    let symbol = normalize_symbol(symbol)?;
    validate_shares(shares)?;

    let owned = seller.shares_owned(&symbol);
    if shares > owned {
        return Err(AppError::InsufficientShares {
            symbol,
            owned,
            requested: shares,
        });
    }

    let price = prices.fetch_price(&symbol).await?;

    let mut account = seller.clone();
    account.balance += price * shares as f64;
    account
        .asset_transactions
        .push(AssetTransaction::sale(account.id, &symbol, price, shares));

    let stored = persist(repo, &account).await?;
    info!(
        "Account {} sold {} {} at {:.2}, balance now {:.2}",
        stored.id, shares, symbol, price, stored.balance
    );
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::simulated::SimulatedProvider;
    use crate::models::User;
    use crate::store::{InMemoryAccountRepository, NewAccount};

    async fn setup(balance: f64) -> (InMemoryAccountRepository, SimulatedProvider, Account) {
        let repo = InMemoryAccountRepository::new();
        let holder = User::new("trader".into(), "trader@example.com".into(), "hash".into(), None);
        let account = repo
            .create(NewAccount {
                holder,
                starting_balance: balance,
            })
            .await
            .unwrap();
        let prices = SimulatedProvider::fixed([("MSFT", 50.0), ("AAPL", 20.0)]);
        (repo, prices, account)
    }

    #[tokio::test]
    async fn test_buy_debits_balance_and_appends_one_transaction() {
        let (repo, prices, account) = setup(1_000.0).await;

        let updated = buy_stock(&repo, &prices, &account, " msft ", 4).await.unwrap();

        assert_eq!(updated.balance, 800.0);
        assert_eq!(updated.asset_transactions.len(), 1);
        let t = &updated.asset_transactions[0];
        assert!(t.is_purchase);
        assert_eq!(t.asset.symbol, "MSFT");
        assert_eq!(t.asset.price_per_share, 50.0);
        assert_eq!(t.shares_amount, 4);

        let stored = repo.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.balance, 800.0);
    }

    #[tokio::test]
    async fn test_buy_can_spend_entire_balance() {
        let (repo, prices, account) = setup(100.0).await;

        let updated = buy_stock(&repo, &prices, &account, "MSFT", 2).await.unwrap();
        assert_eq!(updated.balance, 0.0);
    }

    #[tokio::test]
    async fn test_buy_with_insufficient_balance() {
        let (repo, prices, account) = setup(100.0).await;

        let result = buy_stock(&repo, &prices, &account, "MSFT", 3).await;
        match result {
            Err(AppError::InsufficientBalance { balance, required }) => {
                assert_eq!(balance, 100.0);
                assert_eq!(required, 150.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        let stored = repo.find_by_id(account.id).await.unwrap().unwrap();
        assert!(stored.asset_transactions.is_empty());
    }

    #[tokio::test]
    async fn test_buy_rejects_bad_input() {
        let (repo, prices, account) = setup(100.0).await;

        assert!(matches!(
            buy_stock(&repo, &prices, &account, "  ", 1).await,
            Err(AppError::Validation(msg)) if msg == "Stock symbol is not set"
        ));
        assert!(matches!(
            buy_stock(&repo, &prices, &account, "MSFT", 0).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            buy_stock(&repo, &prices, &account, "ZZZZ", 1).await,
            Err(AppError::InvalidSymbol { symbol }) if symbol == "ZZZZ"
        ));
    }

    #[tokio::test]
    async fn test_sell_credits_balance() {
        let (repo, prices, account) = setup(1_000.0).await;
        let after_buy = buy_stock(&repo, &prices, &account, "MSFT", 10).await.unwrap();

        let after_sell = sell_stock(&repo, &prices, &after_buy, "MSFT", 4).await.unwrap();

        assert_eq!(after_sell.balance, 700.0);
        assert_eq!(after_sell.asset_transactions.len(), 2);
        assert!(!after_sell.asset_transactions[1].is_purchase);
        assert_eq!(after_sell.shares_owned("MSFT"), 6);
    }

    #[tokio::test]
    async fn test_sell_more_than_owned() {
        let (repo, prices, account) = setup(1_000.0).await;
        let after_buy = buy_stock(&repo, &prices, &account, "MSFT", 5).await.unwrap();

        let result = sell_stock(&repo, &prices, &after_buy, "msft", 6).await;
        match result {
            Err(AppError::InsufficientShares { symbol, owned, requested }) => {
                assert_eq!(symbol, "MSFT");
                assert_eq!(owned, 5);
                assert_eq!(requested, 6);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sell_unowned_unknown_symbol_fails_on_ownership_first() {
        let (repo, prices, account) = setup(1_000.0).await;

        let result = sell_stock(&repo, &prices, &account, "ZZZZ", 1).await;
        assert!(matches!(result, Err(AppError::InsufficientShares { owned: 0, .. })));
    }

    #[tokio::test]
    async fn test_buy_beyond_share_limit_is_rejected() {
        let (repo, prices, account) = setup(1e300).await;
        let maxed = buy_stock(&repo, &prices, &account, "MSFT", i64::MAX).await.unwrap();

        let result = buy_stock(&repo, &prices, &maxed, "MSFT", 1).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let stored = repo.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.asset_transactions.len(), 1);
        assert_eq!(crate::services::asset_service::holdings(&stored, None)[0].shares, i64::MAX);
    }

    #[tokio::test]
    async fn test_trade_on_deleted_account_fails() {
        let (repo, prices, account) = setup(1_000.0).await;
        repo.delete(account.id).await.unwrap();

        let result = buy_stock(&repo, &prices, &account, "AAPL", 1).await;
        assert!(matches!(result, Err(AppError::TransactionFailed)));
    }
}
