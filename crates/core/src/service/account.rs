//! Account service.
//!
//! Ties the access policy, the mutation engine, the store and the cache
//! together for the four account operations.

use std::sync::Arc;

use investa_shared::types::AccountId;
use tracing::{debug, info, instrument, warn};

use crate::account::{AccountDetail, AccountUpdateRequest, InvestmentAccount, NewAccountRequest};
use crate::cache::{AccountCache, CacheKey, CacheTtls, CachedValue};
use crate::ledger::{BalanceMutationEngine, LedgerError};
use crate::policy::{AccountAccessPolicy, Operation, Principal};
use crate::store::{ACCOUNT_NOT_FOUND, LedgerStore};

/// Account CRUD with policy checks, atomic balance writes and read caching.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn LedgerStore>,
    cache: Arc<dyn AccountCache>,
    policy: AccountAccessPolicy,
    ttls: CacheTtls,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("policy", &self.policy)
            .field("ttls", &self.ttls)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    /// Creates a new account service.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        cache: Arc<dyn AccountCache>,
        policy: AccountAccessPolicy,
        ttls: CacheTtls,
    ) -> Self {
        Self {
            store,
            cache,
            policy,
            ttls,
        }
    }

    /// Creates an account owned by the requester.
    ///
    /// The payload's account type is checked before anything else, so a
    /// missing or non-creatable type is a denial even if other fields are
    /// invalid.
    ///
    /// # Errors
    ///
    /// `PermissionDenied`, `InvalidBalance`, `Validation` or `Persistence`.
    #[instrument(skip(self, request), fields(user_id = %principal.user_id))]
    pub async fn create(
        &self,
        principal: &Principal,
        request: NewAccountRequest,
    ) -> Result<InvestmentAccount, LedgerError> {
        let account_type = self
            .policy
            .authorize_create(request.account_type.as_deref())
            .inspect_err(|_| warn!(account_type = ?request.account_type, "account creation denied"))?;

        let opening = BalanceMutationEngine::open(&request, account_type, principal.user_id)?;
        let account = self
            .store
            .insert_account(&opening.account, opening.transaction.as_ref())
            .await?;

        self.cache.invalidate(&[CacheKey::User(account.owner_id)]);
        info!(
            account_id = %account.id,
            account_type = %account.account_type,
            balance = %account.balance,
            "account created"
        );
        Ok(account)
    }

    /// Returns an account with its transactions, newest first.
    ///
    /// The policy is checked against the freshly loaded account on every
    /// call; only the response body is served from cache.
    ///
    /// # Errors
    ///
    /// `NotFound`, `PermissionDenied` or `Persistence`.
    #[instrument(skip(self), fields(user_id = %principal.user_id))]
    pub async fn read(&self, principal: &Principal, id: AccountId) -> Result<AccountDetail, LedgerError> {
        let account = self.load(id).await?;
        self.policy.authorize(Operation::Get, &account, principal)?;

        let key = CacheKey::Account(id);
        if let Some(cached) = self.cache.get(&key)
            && let CachedValue::Account(detail) = cached.as_ref()
        {
            debug!(%key, "cache hit");
            return Ok(detail.clone());
        }

        let transactions = self.store.account_transactions(id).await?;
        let detail = AccountDetail {
            account,
            transactions,
        };
        self.cache
            .set(key, CachedValue::Account(detail.clone()), self.ttls.account);
        debug!(%key, "cache fill");
        Ok(detail)
    }

    /// Applies a partial update. `balance` in the payload is a signed delta.
    ///
    /// # Errors
    ///
    /// `NotFound`, `PermissionDenied`, `InsufficientFunds`, `Validation` or
    /// `Persistence`.
    #[instrument(skip(self, request), fields(user_id = %principal.user_id))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: AccountId,
        request: AccountUpdateRequest,
    ) -> Result<InvestmentAccount, LedgerError> {
        let account = self.load(id).await?;
        self.policy.authorize(Operation::Put, &account, principal)?;

        let mutation = BalanceMutationEngine::plan_update(&account, &request, principal.user_id)?;
        let updated = self.store.commit_update(&mutation).await?;

        self.cache
            .invalidate(&[CacheKey::Account(id), CacheKey::User(updated.owner_id)]);
        info!(
            account_id = %id,
            delta = %mutation.delta(),
            balance = %updated.balance,
            recorded = mutation.transaction.is_some(),
            "account updated"
        );
        Ok(updated)
    }

    /// Deletes an account and its transactions.
    ///
    /// # Errors
    ///
    /// `NotFound`, `PermissionDenied` or `Persistence`.
    #[instrument(skip(self), fields(user_id = %principal.user_id))]
    pub async fn delete(&self, principal: &Principal, id: AccountId) -> Result<(), LedgerError> {
        let account = self.load(id).await?;
        self.policy.authorize(Operation::Delete, &account, principal)?;

        if !self.store.delete_account(id).await? {
            return Err(LedgerError::NotFound(ACCOUNT_NOT_FOUND.to_string()));
        }

        self.cache
            .invalidate(&[CacheKey::Account(id), CacheKey::User(account.owner_id)]);
        info!(account_id = %id, "account deleted");
        Ok(())
    }

    async fn load(&self, id: AccountId) -> Result<InvestmentAccount, LedgerError> {
        self.store
            .find_account(id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(ACCOUNT_NOT_FOUND.to_string()))
    }
}
