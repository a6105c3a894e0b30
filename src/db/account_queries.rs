use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::models::{Account, AssetTransaction, User};

// Account joined with its holder; the ledger is loaded separately.
#[derive(Debug, FromRow)]
pub struct AccountRow {
    pub account_id: Uuid,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub pc_name: Option<String>,
    pub date_joined: DateTime<Utc>,
}

impl AccountRow {
    pub fn into_account(self, asset_transactions: Vec<AssetTransaction>) -> Account {
        Account {
            id: self.account_id,
            account_holder: User {
                id: self.user_id,
                username: self.username,
                email: self.email,
                password_hash: self.password_hash,
                pc_name: self.pc_name,
                date_joined: self.date_joined,
            },
            balance: self.balance,
            asset_transactions,
            created_at: self.created_at,
        }
    }
}

const SELECT_ACCOUNT: &str = "SELECT a.id AS account_id, a.balance, a.created_at,
        u.id AS user_id, u.username, u.email, u.password_hash, u.pc_name, u.date_joined
     FROM accounts a
     JOIN users u ON u.id = a.user_id";

pub async fn fetch_one<'e, E>(executor: E, id: Uuid) -> Result<Option<AccountRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{} WHERE a.id = $1", SELECT_ACCOUNT);
    sqlx::query_as::<_, AccountRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn fetch_by_username<'e, E>(executor: E, username: &str) -> Result<Option<AccountRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{} WHERE u.username = $1", SELECT_ACCOUNT);
    sqlx::query_as::<_, AccountRow>(&sql)
        .bind(username)
        .fetch_optional(executor)
        .await
}

pub async fn fetch_by_email<'e, E>(executor: E, email: &str) -> Result<Option<AccountRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{} WHERE u.email = $1", SELECT_ACCOUNT);
    sqlx::query_as::<_, AccountRow>(&sql)
        .bind(email)
        .fetch_optional(executor)
        .await
}

pub async fn insert<'e, E>(executor: E, account: &Account) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO accounts (id, user_id, balance, created_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(account.id)
    .bind(account.account_holder.id)
    .bind(account.balance)
    .bind(account.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Locks the account row for the rest of the transaction.
pub async fn lock_for_update<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM accounts WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row.is_some())
}

/// Moves the stored balance by `delta` relative to its current value.
pub async fn adjust_balance<'e, E>(executor: E, id: Uuid, delta: f64) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("UPDATE accounts SET balance = balance + $1 WHERE id = $2")
        .bind(delta)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
