use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{AccountRepository, DuplicateField, NewAccount, StoreError};
use crate::models::Account;

/// Process-local account store. Backs the `memory` backend and the tests.
#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write();
        let holder = &new_account.holder;

        if accounts.values().any(|a| a.account_holder.email == holder.email) {
            return Err(StoreError::Duplicate(DuplicateField::Email));
        }
        if accounts.values().any(|a| a.account_holder.username == holder.username) {
            return Err(StoreError::Duplicate(DuplicateField::Username));
        }

        let account = Account::new(new_account.holder, new_account.starting_balance);
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .read()
            .values()
            .find(|a| a.account_holder.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .read()
            .values()
            .find(|a| a.account_holder.email == email)
            .cloned())
    }

    async fn update(&self, account: &Account) -> Result<Option<Account>, StoreError> {
        let mut accounts = self.accounts.write();
        match accounts.get_mut(&account.id) {
            Some(stored) => {
                for t in &account.asset_transactions {
                    if !stored.asset_transactions.iter().any(|s| s.id == t.id) {
                        stored.balance += t.cash_effect();
                        stored.asset_transactions.push(t.clone());
                    }
                }
                Ok(Some(stored.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.accounts.write().remove(&id).is_some())
    }
}
