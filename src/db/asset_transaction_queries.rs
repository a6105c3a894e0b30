use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::models::{Asset, AssetTransaction};

#[derive(Debug, FromRow)]
pub struct AssetTransactionRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub is_purchase: bool,
    pub asset_symbol: String,
    pub asset_price_per_share: f64,
    pub shares_amount: i64,
    pub date_processed: DateTime<Utc>,
}

impl From<AssetTransactionRow> for AssetTransaction {
    fn from(row: AssetTransactionRow) -> Self {
        AssetTransaction {
            id: row.id,
            account_id: row.account_id,
            is_purchase: row.is_purchase,
            asset: Asset {
                symbol: row.asset_symbol,
                price_per_share: row.asset_price_per_share,
            },
            shares_amount: row.shares_amount,
            date_processed: row.date_processed,
        }
    }
}

pub async fn fetch_for_account<'e, E>(executor: E, account_id: Uuid) -> Result<Vec<AssetTransaction>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, AssetTransactionRow>(
        "SELECT id, account_id, is_purchase, asset_symbol, asset_price_per_share, shares_amount, date_processed
         FROM asset_transactions
         WHERE account_id = $1
         ORDER BY date_processed ASC, id ASC",
    )
    .bind(account_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(AssetTransaction::from).collect())
}

/// Ledger rows are immutable; re-inserting a known id is a no-op.
pub async fn insert_if_absent<'e, E>(executor: E, t: &AssetTransaction) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "INSERT INTO asset_transactions
            (id, account_id, is_purchase, asset_symbol, asset_price_per_share, shares_amount, date_processed)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(t.id)
    .bind(t.account_id)
    .bind(t.is_purchase)
    .bind(&t.asset.symbol)
    .bind(t.asset.price_per_share)
    .bind(t.shares_amount)
    .bind(t.date_processed)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
