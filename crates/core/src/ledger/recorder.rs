//! Transaction records for balance changes.
//!
//! Every non-zero balance delta produces exactly one transaction. The type is
//! derived from the sign of the delta and the amount keeps the sign, so a
//! withdrawal of 200 is stored as `Withdrawal, -200.00`.

use chrono::{DateTime, Utc};
use investa_shared::types::{AccountId, Money, TransactionId, UserId};
use serde::{Deserialize, Serialize};

/// Direction of a balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Positive delta.
    Deposit,
    /// Negative delta.
    Withdrawal,
}

impl TransactionType {
    /// Classifies a non-zero delta.
    #[must_use]
    pub fn for_delta(delta: Money) -> Self {
        if delta.is_negative() {
            Self::Withdrawal
        } else {
            Self::Deposit
        }
    }

    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::Withdrawal => "Withdrawal",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable record of one balance change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Deposit or withdrawal.
    pub transaction_type: TransactionType,
    /// Signed amount, never zero.
    pub amount: Money,
    /// When the change was committed.
    pub created_at: DateTime<Utc>,
    /// User who made the change.
    pub transaction_by: UserId,
    /// Account the change applies to.
    #[serde(rename = "account")]
    pub account_id: AccountId,
}

impl Transaction {
    /// True when the type agrees with the sign of the amount.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        !self.amount.is_zero() && TransactionType::for_delta(self.amount) == self.transaction_type
    }
}

/// Builds transaction records for balance deltas.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionRecorder;

impl TransactionRecorder {
    /// Records a delta made now. Returns `None` for a zero delta.
    #[must_use]
    pub fn record(account_id: AccountId, delta: Money, acting_user: UserId) -> Option<Transaction> {
        Self::record_at(account_id, delta, acting_user, Utc::now())
    }

    /// Records a delta with an explicit timestamp.
    #[must_use]
    pub fn record_at(
        account_id: AccountId,
        delta: Money,
        acting_user: UserId,
        created_at: DateTime<Utc>,
    ) -> Option<Transaction> {
        if delta.is_zero() {
            return None;
        }

        Some(Transaction {
            id: TransactionId::new(),
            transaction_type: TransactionType::for_delta(delta),
            amount: delta,
            created_at,
            transaction_by: acting_user,
            account_id,
        })
    }
}
