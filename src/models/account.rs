use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AssetTransaction, User};

// A user's trading wallet: cash balance plus the ledger of every trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub account_holder: User,
    pub balance: f64,
    /// Oldest first.
    pub asset_transactions: Vec<AssetTransaction>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(account_holder: User, balance: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_holder,
            balance,
            asset_transactions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Net shares held for `symbol` across the whole ledger. Saturates
    /// instead of overflowing on a corrupt ledger.
    pub fn shares_owned(&self, symbol: &str) -> i64 {
        self.asset_transactions
            .iter()
            .filter(|t| t.asset.symbol == symbol)
            .map(AssetTransaction::signed_shares)
            .fold(0i64, i64::saturating_add)
    }

    /// Net shares per symbol, including symbols that have been fully sold.
    pub fn net_shares_by_symbol(&self) -> BTreeMap<String, i64> {
        let mut totals = BTreeMap::new();
        for t in &self.asset_transactions {
            let total = totals.entry(t.asset.symbol.clone()).or_insert(0i64);
            *total = total.saturating_add(t.signed_shares());
        }
        totals
    }
}
