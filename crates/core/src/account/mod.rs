//! Investment accounts and the payloads that create or change them.

use std::fmt;
use std::str::FromStr;

use investa_shared::types::{AccountId, Money, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::{LedgerError, Transaction};

/// Maximum length of an account name.
pub const MAX_NAME_LEN: usize = 100;

/// Account category. Governs which operations are permitted on an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// View-only.
    #[serde(rename = "ACC1", alias = "TYPE_1")]
    Type1,
    /// Full CRUD.
    #[serde(rename = "ACC2", alias = "TYPE_2")]
    Type2,
    /// Create-only.
    #[serde(rename = "ACC3", alias = "TYPE_3")]
    Type3,
}

impl AccountType {
    /// All account types.
    pub const ALL: [Self; 3] = [Self::Type1, Self::Type2, Self::Type3];

    /// Stored code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Type1 => "ACC1",
            Self::Type2 => "ACC2",
            Self::Type3 => "ACC3",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Type1 => "Account 1",
            Self::Type2 => "Account 2",
            Self::Type3 => "Account 3",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The string is not a known account type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("\"{0}\" is not a valid choice.")]
pub struct UnknownAccountType(pub String);

impl FromStr for AccountType {
    type Err = UnknownAccountType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACC1" | "TYPE_1" => Ok(Self::Type1),
            "ACC2" | "TYPE_2" => Ok(Self::Type2),
            "ACC3" | "TYPE_3" => Ok(Self::Type3),
            other => Err(UnknownAccountType(other.to_string())),
        }
    }
}

/// A user-owned investment account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentAccount {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Current balance, never negative.
    pub balance: Money,
    /// Account category.
    pub account_type: AccountType,
    /// Owning user.
    #[serde(rename = "owner")]
    pub owner_id: UserId,
}

/// Account read response: the account with its history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDetail {
    /// The account itself.
    pub account: InvestmentAccount,
    /// Transactions on the account, most recent first.
    pub transactions: Vec<Transaction>,
}

/// Account creation payload.
///
/// `account_type` stays a raw string so an unknown or missing type is
/// rejected by the access policy rather than by deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAccountRequest {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Absolute opening balance.
    #[serde(default)]
    pub balance: Option<Decimal>,
    /// Requested account type code.
    #[serde(default)]
    pub account_type: Option<String>,
}

/// Partial account update. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdateRequest {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New description. An explicit `null` clears it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    /// Signed change to apply to the balance.
    #[serde(default)]
    pub balance: Option<Decimal>,
    /// New account type code.
    #[serde(default)]
    pub account_type: Option<String>,
}

/// Validates and trims an account name.
///
/// # Errors
///
/// Returns `LedgerError::Validation` for blank or over-long names.
pub fn validate_name(name: &str) -> Result<String, LedgerError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation("name: This field may not be blank.".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(LedgerError::Validation(format!(
            "name: Ensure this field has no more than {MAX_NAME_LEN} characters."
        )));
    }
    Ok(trimmed.to_string())
}

/// Parses an account type supplied in an update payload.
///
/// # Errors
///
/// Returns `LedgerError::Validation` for an unknown code.
pub fn parse_account_type(raw: &str) -> Result<AccountType, LedgerError> {
    raw.parse::<AccountType>()
        .map_err(|e| LedgerError::Validation(format!("account_type: {e}")))
}
