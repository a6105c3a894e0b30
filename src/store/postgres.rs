use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use super::{AccountRepository, DuplicateField, NewAccount, StoreError};
use crate::db::{account_queries, asset_transaction_queries, user_queries};
use crate::models::Account;

#[derive(Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load(&self, row: Option<account_queries::AccountRow>) -> Result<Option<Account>, StoreError> {
        match row {
            Some(row) => {
                let ledger = asset_transaction_queries::fetch_for_account(&self.pool, row.account_id).await?;
                Ok(Some(row.into_account(ledger)))
            }
            None => Ok(None),
        }
    }
}

fn classify(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(c) if c.contains("email") => return StoreError::Duplicate(DuplicateField::Email),
                Some(c) if c.contains("username") => return StoreError::Duplicate(DuplicateField::Username),
                _ => {}
            }
        }
    }
    StoreError::Db(e)
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account, StoreError> {
        let account = Account::new(new_account.holder, new_account.starting_balance);

        let mut tx = self.pool.begin().await?;
        user_queries::insert(&mut *tx, &account.account_holder)
            .await
            .map_err(classify)?;
        account_queries::insert(&mut *tx, &account).await?;
        tx.commit().await?;

        info!("Created account {} for user {}", account.id, account.account_holder.username);
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let row = account_queries::fetch_one(&self.pool, id).await?;
        self.load(row).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let row = account_queries::fetch_by_username(&self.pool, username).await?;
        self.load(row).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row = account_queries::fetch_by_email(&self.pool, email).await?;
        self.load(row).await
    }

    async fn update(&self, account: &Account) -> Result<Option<Account>, StoreError> {
        let mut tx = self.pool.begin().await?;

        if !account_queries::lock_for_update(&mut *tx, account.id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let mut appended = 0;
        let mut delta = 0.0;
        for t in &account.asset_transactions {
            let inserted = asset_transaction_queries::insert_if_absent(&mut *tx, t)
                .await
                .map_err(|e| {
                    error!("Failed to append transaction {} to account {}: {}", t.id, account.id, e);
                    e
                })?;
            if inserted > 0 {
                appended += inserted;
                delta += t.cash_effect();
            }
        }
        if appended > 0 {
            account_queries::adjust_balance(&mut *tx, account.id, delta).await?;
        }
        tx.commit().await?;

        info!("Updated account {} (balance change {:.2}, {} new transactions)", account.id, delta, appended);
        self.find_by_id(account.id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let removed = user_queries::delete_by_account(&self.pool, id).await?;
        Ok(removed > 0)
    }
}
