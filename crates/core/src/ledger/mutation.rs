//! Balance mutation engine.
//!
//! Two rules govern balances:
//! - On creation the submitted balance is absolute and must be non-negative.
//! - On update the submitted balance is a signed delta, and the resulting
//!   balance must stay non-negative.
//!
//! The engine only plans changes; stores apply them atomically, re-checking
//! the delta against the balance they hold at commit time.

use chrono::{DateTime, Utc};
use investa_shared::types::{AccountId, Money, UserId};
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::recorder::{Transaction, TransactionRecorder};
use crate::account::{
    AccountType, AccountUpdateRequest, InvestmentAccount, NewAccountRequest, parse_account_type,
    validate_name,
};

/// Before/after view of one balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceChange {
    /// Balance before the change.
    pub previous: Money,
    /// Signed delta.
    pub delta: Money,
    /// Balance after the change.
    pub new_balance: Money,
}

/// A new account together with its opening deposit, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOpening {
    /// The account to insert.
    pub account: InvestmentAccount,
    /// Deposit recorded for a non-zero opening balance.
    pub transaction: Option<Transaction>,
}

/// A validated partial update of one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMutation {
    /// Target account.
    pub account_id: AccountId,
    /// Balance change planned against the balance read at planning time.
    pub change: BalanceChange,
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// Replacement account type.
    pub account_type: Option<AccountType>,
    /// Transaction for a non-zero delta. Its `created_at` is provisional
    /// until [`AccountMutation::stamped`] sets the commit time.
    pub transaction: Option<Transaction>,
}

impl AccountMutation {
    /// Signed delta carried by the mutation.
    #[must_use]
    pub const fn delta(&self) -> Money {
        self.change.delta
    }

    /// Applies the mutation to the account as currently stored.
    ///
    /// The delta is re-applied to `current.balance`, which may differ from the
    /// balance seen when the mutation was planned.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InsufficientFunds` if the stored balance can no
    /// longer absorb the delta.
    pub fn apply_to(&self, current: &InvestmentAccount) -> Result<InvestmentAccount, LedgerError> {
        let change = BalanceMutationEngine::apply_delta(current.balance, self.change.delta.amount())?;

        let mut updated = current.clone();
        updated.balance = change.new_balance;
        if let Some(name) = &self.name {
            updated.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            updated.description.clone_from(description);
        }
        if let Some(account_type) = self.account_type {
            updated.account_type = account_type;
        }
        Ok(updated)
    }

    /// The transaction to append, stamped with the commit time.
    ///
    /// Stores call this while holding the write that serializes commits on
    /// the account, so `created_at` follows commit order.
    #[must_use]
    pub fn stamped(&self, committed_at: DateTime<Utc>) -> Option<Transaction> {
        self.transaction.clone().map(|mut tx| {
            tx.created_at = committed_at;
            tx
        })
    }
}

/// Computes balance changes and the transactions they produce.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceMutationEngine;

impl BalanceMutationEngine {
    /// Validates an opening balance. A missing balance opens at zero.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidBalance` for a negative balance and
    /// `LedgerError::Validation` when the amount does not fit the column.
    pub fn opening_balance(balance: Option<Decimal>) -> Result<BalanceChange, LedgerError> {
        let requested = balance.unwrap_or(Decimal::ZERO);
        if requested.is_sign_negative() && !requested.is_zero() {
            return Err(LedgerError::InvalidBalance(requested));
        }

        let opening = Money::new(requested)?;
        Ok(BalanceChange {
            previous: Money::ZERO,
            delta: opening,
            new_balance: opening,
        })
    }

    /// Applies a signed delta to a balance.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InsufficientFunds` if the result would be
    /// negative and `LedgerError::Validation` when the delta or the result does
    /// not fit the column.
    pub fn apply_delta(current: Money, delta: Decimal) -> Result<BalanceChange, LedgerError> {
        let delta_money = Money::new(delta)?;
        let new_balance = current.checked_add(delta_money)?;

        if new_balance.is_negative() {
            return Err(LedgerError::InsufficientFunds {
                balance: current.amount(),
                requested: delta_money.amount(),
            });
        }

        Ok(BalanceChange {
            previous: current,
            delta: delta_money,
            new_balance,
        })
    }

    /// Builds a new account from a creation payload whose type has already
    /// passed the access policy.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a missing or invalid name, or any error
    /// from [`Self::opening_balance`].
    pub fn open(
        request: &NewAccountRequest,
        account_type: AccountType,
        owner: UserId,
    ) -> Result<AccountOpening, LedgerError> {
        let name = request
            .name
            .as_deref()
            .ok_or_else(|| LedgerError::Validation("name: This field is required.".to_string()))
            .and_then(validate_name)?;
        let change = Self::opening_balance(request.balance)?;

        let account = InvestmentAccount {
            id: AccountId::new(),
            name,
            description: request.description.clone(),
            balance: change.new_balance,
            account_type,
            owner_id: owner,
        };
        let transaction = TransactionRecorder::record(account.id, change.delta, owner);

        Ok(AccountOpening {
            account,
            transaction,
        })
    }

    /// Plans a partial update of `account` made by `acting_user`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid name or account type, or any
    /// error from [`Self::apply_delta`].
    pub fn plan_update(
        account: &InvestmentAccount,
        request: &AccountUpdateRequest,
        acting_user: UserId,
    ) -> Result<AccountMutation, LedgerError> {
        let name = request.name.as_deref().map(validate_name).transpose()?;
        let account_type = request
            .account_type
            .as_deref()
            .map(parse_account_type)
            .transpose()?;
        let change = Self::apply_delta(account.balance, request.balance.unwrap_or(Decimal::ZERO))?;
        let transaction = TransactionRecorder::record(account.id, change.delta, acting_user);

        Ok(AccountMutation {
            account_id: account.id,
            change,
            name,
            description: request.description.clone(),
            account_type,
            transaction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionType;
    use rust_decimal_macros::dec;

    fn account_with_balance(balance: Decimal) -> InvestmentAccount {
        InvestmentAccount {
            id: AccountId::new(),
            name: "Core".to_string(),
            description: None,
            balance: Money::new(balance).unwrap(),
            account_type: AccountType::Type2,
            owner_id: UserId::new(),
        }
    }

    fn delta(amount: Decimal) -> AccountUpdateRequest {
        AccountUpdateRequest {
            balance: Some(amount),
            ..Default::default()
        }
    }

    #[test]
    fn test_opening_balance_defaults_to_zero() {
        let change = BalanceMutationEngine::opening_balance(None).unwrap();
        assert_eq!(change.new_balance, Money::ZERO);
        assert!(change.delta.is_zero());
    }

    #[test]
    fn test_negative_opening_balance_rejected() {
        assert_eq!(
            BalanceMutationEngine::opening_balance(Some(dec!(-5))),
            Err(LedgerError::InvalidBalance(dec!(-5)))
        );
    }

    #[test]
    fn test_opening_balance_precision() {
        assert!(matches!(
            BalanceMutationEngine::opening_balance(Some(dec!(1.005))),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_open_records_deposit() {
        let owner = UserId::new();
        let request = NewAccountRequest {
            name: Some("Growth".to_string()),
            balance: Some(dec!(500)),
            ..Default::default()
        };
        let opening = BalanceMutationEngine::open(&request, AccountType::Type2, owner).unwrap();

        assert_eq!(opening.account.balance.to_string(), "500.00");
        assert_eq!(opening.account.owner_id, owner);
        let tx = opening.transaction.unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Deposit);
        assert_eq!(tx.amount.amount(), dec!(500));
        assert_eq!(tx.account_id, opening.account.id);
        assert_eq!(tx.transaction_by, owner);
    }

    #[test]
    fn test_open_zero_balance_records_nothing() {
        let request = NewAccountRequest {
            name: Some("Empty".to_string()),
            ..Default::default()
        };
        let opening =
            BalanceMutationEngine::open(&request, AccountType::Type3, UserId::new()).unwrap();
        assert!(opening.transaction.is_none());
        assert!(opening.account.balance.is_zero());
    }

    #[test]
    fn test_open_requires_name() {
        let request = NewAccountRequest {
            balance: Some(dec!(1)),
            ..Default::default()
        };
        assert!(matches!(
            BalanceMutationEngine::open(&request, AccountType::Type2, UserId::new()),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_withdrawal_within_balance() {
        let account = account_with_balance(dec!(1000));
        let actor = UserId::new();
        let mutation = BalanceMutationEngine::plan_update(&account, &delta(dec!(-200)), actor).unwrap();

        assert_eq!(mutation.change.new_balance.to_string(), "800.00");
        let tx = mutation.transaction.as_ref().unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Withdrawal);
        assert_eq!(tx.amount.to_string(), "-200.00");
        assert_eq!(tx.transaction_by, actor);
    }

    #[test]
    fn test_withdrawal_to_exactly_zero() {
        let account = account_with_balance(dec!(100));
        let mutation =
            BalanceMutationEngine::plan_update(&account, &delta(dec!(-100)), UserId::new()).unwrap();
        assert!(mutation.change.new_balance.is_zero());
    }

    #[test]
    fn test_overdraw_rejected() {
        let account = account_with_balance(dec!(100));
        assert_eq!(
            BalanceMutationEngine::plan_update(&account, &delta(dec!(-100.01)), UserId::new()),
            Err(LedgerError::InsufficientFunds {
                balance: dec!(100.00),
                requested: dec!(-100.01),
            })
        );
    }

    #[test]
    fn test_metadata_only_update() {
        let account = account_with_balance(dec!(50));
        let request = AccountUpdateRequest {
            name: Some("Renamed".to_string()),
            description: Some(Some("notes".to_string())),
            account_type: Some("ACC1".to_string()),
            ..Default::default()
        };
        let mutation = BalanceMutationEngine::plan_update(&account, &request, UserId::new()).unwrap();

        assert!(mutation.transaction.is_none());
        assert!(mutation.delta().is_zero());

        let updated = mutation.apply_to(&account).unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.description.as_deref(), Some("notes"));
        assert_eq!(updated.account_type, AccountType::Type1);
        assert_eq!(updated.balance, account.balance);
    }

    #[test]
    fn test_description_cleared_by_explicit_null() {
        let mut account = account_with_balance(dec!(50));
        account.description = Some("old".to_string());

        let keep: AccountUpdateRequest = serde_json::from_str(r#"{"name": "Kept"}"#).unwrap();
        let clear: AccountUpdateRequest = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(keep.description, None);
        assert_eq!(clear.description, Some(None));

        let kept = BalanceMutationEngine::plan_update(&account, &keep, UserId::new())
            .unwrap()
            .apply_to(&account)
            .unwrap();
        assert_eq!(kept.description.as_deref(), Some("old"));

        let cleared = BalanceMutationEngine::plan_update(&account, &clear, UserId::new())
            .unwrap()
            .apply_to(&account)
            .unwrap();
        assert_eq!(cleared.description, None);
    }

    #[test]
    fn test_stamped_uses_commit_time() {
        let account = account_with_balance(dec!(50));
        let mutation =
            BalanceMutationEngine::plan_update(&account, &delta(dec!(5)), UserId::new()).unwrap();
        let committed_at = Utc::now() + chrono::Duration::seconds(30);

        let tx = mutation.stamped(committed_at).unwrap();
        assert_eq!(tx.created_at, committed_at);
        assert_eq!(tx.id, mutation.transaction.as_ref().unwrap().id);

        let metadata_only = AccountUpdateRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let mutation = BalanceMutationEngine::plan_update(&account, &metadata_only, UserId::new()).unwrap();
        assert!(mutation.stamped(committed_at).is_none());
    }

    #[test]
    fn test_invalid_type_on_update() {
        let account = account_with_balance(dec!(50));
        let request = AccountUpdateRequest {
            account_type: Some("ACC4".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            BalanceMutationEngine::plan_update(&account, &request, UserId::new()),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_apply_to_rechecks_stored_balance() {
        let planned_on = account_with_balance(dec!(100));
        let mutation =
            BalanceMutationEngine::plan_update(&planned_on, &delta(dec!(-80)), UserId::new()).unwrap();

        let mut stored = planned_on.clone();
        stored.balance = Money::new(dec!(50)).unwrap();

        assert!(matches!(
            mutation.apply_to(&stored),
            Err(LedgerError::InsufficientFunds { .. })
        ));
    }
}
