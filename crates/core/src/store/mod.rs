//! Storage ports.
//!
//! The account service and report service only see these traits. The
//! database crate implements them on top of Postgres; [`MemoryStore`] keeps
//! everything in process for tests and single-node runs.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use investa_shared::AppResult;
use investa_shared::types::{AccountId, UserId};

use crate::account::InvestmentAccount;
use crate::auth::{NewUser, UserRecord};
use crate::ledger::{AccountMutation, LedgerError, Transaction};
use crate::reports::CreatedAtWindow;

/// Message for a missing account.
pub const ACCOUNT_NOT_FOUND: &str = "No InvestmentAccount matches the given query.";

/// Message for a missing user.
pub const USER_NOT_FOUND: &str = "No User matches the given query.";

/// Accounts and their transactions.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Inserts a new account and its opening transaction as one unit.
    async fn insert_account(
        &self,
        account: &InvestmentAccount,
        opening: Option<&Transaction>,
    ) -> Result<InvestmentAccount, LedgerError>;

    /// Loads one account.
    async fn find_account(&self, id: AccountId) -> Result<Option<InvestmentAccount>, LedgerError>;

    /// Transactions on one account, newest first.
    async fn account_transactions(&self, id: AccountId) -> Result<Vec<Transaction>, LedgerError>;

    /// Applies an update and appends its transaction as one unit.
    ///
    /// The delta is re-checked against the stored balance; a commit that
    /// would drive it negative fails with `InsufficientFunds` and leaves
    /// nothing behind.
    async fn commit_update(&self, mutation: &AccountMutation) -> Result<InvestmentAccount, LedgerError>;

    /// Deletes an account and its transactions. Returns false if it did not exist.
    async fn delete_account(&self, id: AccountId) -> Result<bool, LedgerError>;

    /// All accounts owned by a user.
    async fn accounts_for_owner(&self, owner: UserId) -> Result<Vec<InvestmentAccount>, LedgerError>;

    /// Transactions on any of `accounts`, oldest first, optionally windowed.
    async fn transactions_for_accounts(
        &self,
        accounts: &[AccountId],
        window: Option<CreatedAtWindow>,
    ) -> Result<Vec<Transaction>, LedgerError>;
}

/// Registered users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. A taken username is a validation error.
    async fn create_user(&self, user: NewUser) -> AppResult<UserRecord>;

    /// Loads a user by ID.
    async fn find_user(&self, id: UserId) -> AppResult<Option<UserRecord>>;

    /// Loads a user by username.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>>;
}
