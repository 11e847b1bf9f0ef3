//! In-process store.
//!
//! All state sits behind one `RwLock`, so every write (balance plus
//! transaction) is applied under a single exclusive guard.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use investa_shared::types::{AccountId, UserId};
use investa_shared::{AppError, AppResult};
use tokio::sync::RwLock;

use super::{ACCOUNT_NOT_FOUND, LedgerStore, UserStore};
use crate::account::InvestmentAccount;
use crate::auth::{NewUser, UserRecord};
use crate::ledger::{AccountMutation, LedgerError, Transaction};
use crate::reports::CreatedAtWindow;

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, UserRecord>,
    accounts: BTreeMap<AccountId, InvestmentAccount>,
    transactions: Vec<Transaction>,
}

/// Store keeping users, accounts and transactions in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transactions.
    pub async fn transaction_count(&self) -> usize {
        self.state.read().await.transactions.len()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn insert_account(
        &self,
        account: &InvestmentAccount,
        opening: Option<&Transaction>,
    ) -> Result<InvestmentAccount, LedgerError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&account.owner_id) {
            return Err(LedgerError::Persistence(format!(
                "owner {} does not exist",
                account.owner_id
            )));
        }
        if state.accounts.contains_key(&account.id) {
            return Err(LedgerError::Persistence(format!(
                "account {} already exists",
                account.id
            )));
        }

        state.accounts.insert(account.id, account.clone());
        if let Some(tx) = opening {
            state.transactions.push(tx.clone());
        }
        Ok(account.clone())
    }

    async fn find_account(&self, id: AccountId) -> Result<Option<InvestmentAccount>, LedgerError> {
        Ok(self.state.read().await.accounts.get(&id).cloned())
    }

    async fn account_transactions(&self, id: AccountId) -> Result<Vec<Transaction>, LedgerError> {
        let state = self.state.read().await;
        let mut transactions: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|tx| tx.account_id == id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(transactions)
    }

    async fn commit_update(&self, mutation: &AccountMutation) -> Result<InvestmentAccount, LedgerError> {
        let mut state = self.state.write().await;
        let current = state
            .accounts
            .get(&mutation.account_id)
            .ok_or_else(|| LedgerError::NotFound(ACCOUNT_NOT_FOUND.to_string()))?;

        let updated = mutation.apply_to(current)?;
        state.accounts.insert(updated.id, updated.clone());
        if let Some(tx) = mutation.stamped(Utc::now()) {
            state.transactions.push(tx);
        }
        Ok(updated)
    }

    async fn delete_account(&self, id: AccountId) -> Result<bool, LedgerError> {
        let mut state = self.state.write().await;
        if state.accounts.remove(&id).is_none() {
            return Ok(false);
        }
        state.transactions.retain(|tx| tx.account_id != id);
        Ok(true)
    }

    async fn accounts_for_owner(&self, owner: UserId) -> Result<Vec<InvestmentAccount>, LedgerError> {
        Ok(self
            .state
            .read()
            .await
            .accounts
            .values()
            .filter(|account| account.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn transactions_for_accounts(
        &self,
        accounts: &[AccountId],
        window: Option<CreatedAtWindow>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let state = self.state.read().await;
        let mut transactions: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|tx| accounts.contains(&tx.account_id))
            .filter(|tx| window.is_none_or(|w| w.contains(tx.created_at)))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(transactions)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> AppResult<UserRecord> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(AppError::Validation(
                "A user with that username already exists.".to_string(),
            ));
        }

        let record = user.into_record(Utc::now());
        state.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_user(&self, id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::account::{AccountType, AccountUpdateRequest, NewAccountRequest};
    use crate::ledger::BalanceMutationEngine;
    use investa_shared::types::Money;
    use rust_decimal_macros::dec;

    async fn seed_user(store: &MemoryStore, username: &str) -> UserRecord {
        store
            .create_user(NewUser {
                username: username.to_string(),
                email: None,
                first_name: String::new(),
                last_name: String::new(),
                password_hash: "hash".to_string(),
                is_staff: false,
            })
            .await
            .unwrap()
    }

    async fn open(store: &MemoryStore, owner: UserId, balance: rust_decimal::Decimal) -> InvestmentAccount {
        let request = NewAccountRequest {
            name: Some("Mem".to_string()),
            balance: Some(balance),
            ..Default::default()
        };
        let opening = BalanceMutationEngine::open(&request, AccountType::Type2, owner).unwrap();
        store
            .insert_account(&opening.account, opening.transaction.as_ref())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        seed_user(&store, "alice").await;
        let err = store
            .create_user(NewUser {
                username: "alice".to_string(),
                email: None,
                first_name: String::new(),
                last_name: String::new(),
                password_hash: "hash".to_string(),
                is_staff: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.find_user_by_username("alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_insert_requires_owner() {
        let store = MemoryStore::new();
        let request = NewAccountRequest {
            name: Some("Orphan".to_string()),
            ..Default::default()
        };
        let opening =
            BalanceMutationEngine::open(&request, AccountType::Type2, UserId::new()).unwrap();
        assert!(matches!(
            store.insert_account(&opening.account, None).await,
            Err(LedgerError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_insert_with_opening_deposit() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "bob").await;
        let account = open(&store, owner.id, dec!(500)).await;

        let history = store.account_transactions(account.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount.amount(), dec!(500));
    }

    #[tokio::test]
    async fn test_commit_update_rechecks_balance() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "carol").await;
        let account = open(&store, owner.id, dec!(100)).await;

        let request = AccountUpdateRequest {
            balance: Some(dec!(-80)),
            ..Default::default()
        };
        let first = BalanceMutationEngine::plan_update(&account, &request, owner.id).unwrap();
        let second = BalanceMutationEngine::plan_update(&account, &request, owner.id).unwrap();

        store.commit_update(&first).await.unwrap();
        assert!(matches!(
            store.commit_update(&second).await,
            Err(LedgerError::InsufficientFunds { .. })
        ));

        let stored = store.find_account(account.id).await.unwrap().unwrap();
        assert_eq!(stored.balance, Money::new(dec!(20)).unwrap());
        assert_eq!(store.transaction_count().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_withdrawals_never_overdraw() {
        let store = Arc::new(MemoryStore::new());
        let owner = seed_user(&store, "dave").await;
        let account = open(&store, owner.id, dec!(100)).await;

        let request = AccountUpdateRequest {
            balance: Some(dec!(-30)),
            ..Default::default()
        };
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let store = Arc::clone(&store);
                let mutation =
                    BalanceMutationEngine::plan_update(&account, &request, owner.id).unwrap();
                tokio::spawn(async move { store.commit_update(&mutation).await })
            })
            .collect();

        let mut committed = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                committed += 1;
            }
        }

        assert_eq!(committed, 3);
        let stored = store.find_account(account.id).await.unwrap().unwrap();
        assert_eq!(stored.balance, Money::new(dec!(10)).unwrap());
        assert_eq!(store.account_transactions(account.id).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_transactions_stamped_in_commit_order() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "frank").await;
        let account = open(&store, owner.id, dec!(100)).await;

        let mut planned = Vec::new();
        for amount in [dec!(1), dec!(2), dec!(3)] {
            let request = AccountUpdateRequest {
                balance: Some(amount),
                ..Default::default()
            };
            planned.push(BalanceMutationEngine::plan_update(&account, &request, owner.id).unwrap());
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        // Commit in reverse of planning order.
        for mutation in planned.iter().rev() {
            store.commit_update(mutation).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let newest_first: Vec<_> = store
            .account_transactions(account.id)
            .await
            .unwrap()
            .into_iter()
            .map(|tx| tx.amount.to_string())
            .collect();
        assert_eq!(newest_first, ["1.00", "2.00", "3.00", "100.00"]);
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "erin").await;
        let account = open(&store, owner.id, dec!(10)).await;

        assert!(store.delete_account(account.id).await.unwrap());
        assert!(!store.delete_account(account.id).await.unwrap());
        assert!(store.find_account(account.id).await.unwrap().is_none());
        assert_eq!(store.transaction_count().await, 0);
    }

    #[tokio::test]
    async fn test_commit_update_missing_account() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "frank").await;
        let account = open(&store, owner.id, dec!(10)).await;
        let mutation = BalanceMutationEngine::plan_update(
            &account,
            &AccountUpdateRequest::default(),
            owner.id,
        )
        .unwrap();
        store.delete_account(account.id).await.unwrap();

        assert!(matches!(
            store.commit_update(&mutation).await,
            Err(LedgerError::NotFound(_))
        ));
    }
}
