//! Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use investa_core::account::AccountType as DomainAccountType;
use investa_core::ledger::TransactionType as DomainTransactionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "ACC1")]
    Acc1,
    #[sea_orm(string_value = "ACC2")]
    Acc2,
    #[sea_orm(string_value = "ACC3")]
    Acc3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
pub enum TransactionType {
    #[sea_orm(string_value = "Deposit")]
    Deposit,
    #[sea_orm(string_value = "Withdrawal")]
    Withdrawal,
}

impl From<DomainAccountType> for AccountType {
    fn from(value: DomainAccountType) -> Self {
        match value {
            DomainAccountType::Type1 => Self::Acc1,
            DomainAccountType::Type2 => Self::Acc2,
            DomainAccountType::Type3 => Self::Acc3,
        }
    }
}

impl From<AccountType> for DomainAccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Acc1 => Self::Type1,
            AccountType::Acc2 => Self::Type2,
            AccountType::Acc3 => Self::Type3,
        }
    }
}

impl From<DomainTransactionType> for TransactionType {
    fn from(value: DomainTransactionType) -> Self {
        match value {
            DomainTransactionType::Deposit => Self::Deposit,
            DomainTransactionType::Withdrawal => Self::Withdrawal,
        }
    }
}

impl From<TransactionType> for DomainTransactionType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Deposit => Self::Deposit,
            TransactionType::Withdrawal => Self::Withdrawal,
        }
    }
}
