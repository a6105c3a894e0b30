pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Account, User};

pub use memory::InMemoryAccountRepository;
pub use postgres::PostgresAccountRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Email,
    Username,
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateField::Email => f.write_str("email"),
            DuplicateField::Username => f.write_str("username"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("duplicate {0}")]
    Duplicate(DuplicateField),
}

/// Fields needed to open a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub holder: User,
    pub starting_balance: f64,
}

/// Persistence seam for accounts, their holders and their ledgers.
///
/// `update` appends any ledger entries the store has not seen yet and moves
/// the stored balance by their cash effect, as one atomic write. The balance
/// on the passed account is not written back, so two trades made from the
/// same stale snapshot both land. It returns `None` when the account no
/// longer exists.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create(&self, new_account: NewAccount) -> Result<Account, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn update(&self, account: &Account) -> Result<Option<Account>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
