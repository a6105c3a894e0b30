use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Symbol and the price paid or received per share.
///
/// Owned by an [`AssetTransaction`]; it has no identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub symbol: String,
    pub price_per_share: f64,
}

// One buy or sell event in an account's ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetTransaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub is_purchase: bool,
    pub asset: Asset,
    pub shares_amount: i64,
    pub date_processed: DateTime<Utc>,
}

impl AssetTransaction {
    pub fn purchase(account_id: Uuid, symbol: &str, price_per_share: f64, shares_amount: i64) -> Self {
        Self::new(account_id, true, symbol, price_per_share, shares_amount)
    }

    pub fn sale(account_id: Uuid, symbol: &str, price_per_share: f64, shares_amount: i64) -> Self {
        Self::new(account_id, false, symbol, price_per_share, shares_amount)
    }

    fn new(account_id: Uuid, is_purchase: bool, symbol: &str, price_per_share: f64, shares_amount: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            is_purchase,
            asset: Asset {
                symbol: symbol.to_string(),
                price_per_share,
            },
            shares_amount,
            date_processed: Utc::now(),
        }
    }

    /// Change to the account's cash: negative for purchases, positive for sales.
    pub fn cash_effect(&self) -> f64 {
        let gross = self.asset.price_per_share * self.shares_amount as f64;
        if self.is_purchase {
            -gross
        } else {
            gross
        }
    }

    /// Shares with the sign of the trade: positive for purchases, negative for sales.
    pub fn signed_shares(&self) -> i64 {
        if self.is_purchase {
            self.shares_amount
        } else {
            -self.shares_amount
        }
    }
}
