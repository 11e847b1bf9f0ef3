//! Account access policy.
//!
//! Each account type permits a fixed set of operations:
//!
//! | Type | GET | POST | PUT | DELETE |
//! |------|-----|------|-----|--------|
//! | ACC1 | yes | no   | no  | no     |
//! | ACC2 | yes | yes  | yes | yes    |
//! | ACC3 | no  | yes  | no  | no     |
//!
//! Creation is checked against the type named in the payload; every other
//! operation is checked against the stored account. Ownership is not required
//! unless `enforce_ownership` is switched on, in which case staff are exempt.

use std::fmt;

use investa_shared::types::{AccountId, UserId};
use serde::{Deserialize, Serialize};

use crate::account::{AccountType, InvestmentAccount};
use crate::ledger::LedgerError;

/// An operation on an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// Read.
    Get,
    /// Create.
    Post,
    /// Update.
    Put,
    /// Delete.
    Delete,
}

impl Operation {
    /// HTTP method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user a request acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// User ID.
    pub user_id: UserId,
    /// Staff users may use the admin report.
    pub is_staff: bool,
}

impl Principal {
    /// A regular user.
    #[must_use]
    pub const fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            is_staff: false,
        }
    }

    /// A staff user.
    #[must_use]
    pub const fn staff(user_id: UserId) -> Self {
        Self {
            user_id,
            is_staff: true,
        }
    }
}

/// Decides whether a principal may perform an operation on an account.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountAccessPolicy {
    enforce_ownership: bool,
}

impl AccountAccessPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(enforce_ownership: bool) -> Self {
        Self { enforce_ownership }
    }

    /// Whether object checks require ownership.
    #[must_use]
    pub const fn enforces_ownership(&self) -> bool {
        self.enforce_ownership
    }

    /// Operations permitted on an account type.
    #[must_use]
    pub const fn permitted_operations(account_type: AccountType) -> &'static [Operation] {
        match account_type {
            AccountType::Type1 => &[Operation::Get],
            AccountType::Type2 => &[
                Operation::Get,
                Operation::Post,
                Operation::Put,
                Operation::Delete,
            ],
            AccountType::Type3 => &[Operation::Post],
        }
    }

    /// Table lookup. An absent type permits nothing.
    #[must_use]
    pub fn allowed(operation: Operation, account_type: Option<AccountType>) -> bool {
        account_type.is_some_and(|t| Self::permitted_operations(t).contains(&operation))
    }

    /// Object-level decision for an existing account.
    #[must_use]
    pub fn allowed_on_object(
        &self,
        operation: Operation,
        account: &InvestmentAccount,
        requester: &Principal,
    ) -> bool {
        if !Self::allowed(operation, Some(account.account_type)) {
            return false;
        }
        !self.enforce_ownership || requester.is_staff || account.owner_id == requester.user_id
    }

    /// Checks a creation payload's raw account type.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::PermissionDenied` when the type is missing,
    /// unknown, or does not permit creation.
    pub fn authorize_create(&self, raw_type: Option<&str>) -> Result<AccountType, LedgerError> {
        let account_type = raw_type.and_then(|raw| raw.parse::<AccountType>().ok());
        match account_type {
            Some(t) if Self::allowed(Operation::Post, Some(t)) => Ok(t),
            _ => Err(LedgerError::permission_denied()),
        }
    }

    /// Checks an operation on a stored account.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::PermissionDenied` when the operation is refused.
    pub fn authorize(
        &self,
        operation: Operation,
        account: &InvestmentAccount,
        requester: &Principal,
    ) -> Result<(), LedgerError> {
        if self.allowed_on_object(operation, account, requester) {
            Ok(())
        } else {
            Err(LedgerError::permission_denied())
        }
    }
}

/// Parses an account identifier taken from a request path.
///
/// # Errors
///
/// A malformed identifier is reported as `LedgerError::PermissionDenied`.
pub fn parse_account_id(raw: &str) -> Result<AccountId, LedgerError> {
    raw.parse::<AccountId>()
        .map_err(|_| LedgerError::permission_denied())
}
