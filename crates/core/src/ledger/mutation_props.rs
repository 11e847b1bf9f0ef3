//! Property-based tests for the balance mutation engine.
//!
//! - Property 1: Balances never go negative
//! - Property 2: Every non-zero delta yields exactly one matching transaction
//! - Property 3: Replaying recorded transactions reproduces the balance

use investa_shared::types::{AccountId, Money, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::mutation::BalanceMutationEngine;
use super::recorder::TransactionType;
use crate::account::{AccountType, AccountUpdateRequest, InvestmentAccount};

/// Strategy for opening balances (0.00 to 10,000.00).
fn opening_amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for signed deltas (-10,000.00 to 10,000.00).
fn signed_delta() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn make_account(balance: Decimal) -> InvestmentAccount {
    InvestmentAccount {
        id: AccountId::new(),
        name: "Prop".to_string(),
        description: None,
        balance: Money::new(balance).unwrap(),
        account_type: AccountType::Type2,
        owner_id: UserId::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property 1: a planned update either keeps the balance non-negative or
    /// is refused with InsufficientFunds exactly when balance + delta < 0.
    #[test]
    fn prop_balance_never_negative(balance in opening_amount(), delta in signed_delta()) {
        let account = make_account(balance);
        let request = AccountUpdateRequest { balance: Some(delta), ..Default::default() };

        match BalanceMutationEngine::plan_update(&account, &request, UserId::new()) {
            Ok(mutation) => {
                prop_assert!(!mutation.change.new_balance.is_negative());
                prop_assert_eq!(mutation.change.new_balance.amount(), balance + delta);
            }
            Err(LedgerError::InsufficientFunds { .. }) => {
                prop_assert!(balance + delta < Decimal::ZERO);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    /// Property 2: transactions correspond one-to-one with non-zero deltas.
    #[test]
    fn prop_transaction_matches_delta(balance in opening_amount(), delta in signed_delta()) {
        prop_assume!(balance + delta >= Decimal::ZERO);
        let account = make_account(balance);
        let actor = UserId::new();
        let request = AccountUpdateRequest { balance: Some(delta), ..Default::default() };

        let mutation = BalanceMutationEngine::plan_update(&account, &request, actor).unwrap();
        match mutation.transaction {
            None => prop_assert!(delta.is_zero()),
            Some(tx) => {
                prop_assert_eq!(tx.amount.amount(), delta);
                prop_assert_eq!(tx.account_id, account.id);
                prop_assert_eq!(tx.transaction_by, actor);
                let expected = if delta < Decimal::ZERO {
                    TransactionType::Withdrawal
                } else {
                    TransactionType::Deposit
                };
                prop_assert_eq!(tx.transaction_type, expected);
            }
        }
    }

    /// Property 3: the sum of recorded amounts equals the final balance.
    #[test]
    fn prop_transactions_replay_to_balance(
        opening in opening_amount(),
        deltas in prop::collection::vec(signed_delta(), 0..20),
    ) {
        let owner = UserId::new();
        let change = BalanceMutationEngine::opening_balance(Some(opening)).unwrap();
        let mut account = make_account(opening);
        let mut recorded = Decimal::ZERO;
        if !change.delta.is_zero() {
            recorded += change.delta.amount();
        }

        for delta in deltas {
            let request = AccountUpdateRequest { balance: Some(delta), ..Default::default() };
            if let Ok(mutation) = BalanceMutationEngine::plan_update(&account, &request, owner) {
                if let Some(tx) = &mutation.transaction {
                    recorded += tx.amount.amount();
                }
                account = mutation.apply_to(&account).unwrap();
            }
        }

        prop_assert_eq!(recorded, account.balance.amount());
        prop_assert!(!account.balance.is_negative());
    }
}
