//! Balance bookkeeping for investment accounts.
//!
//! This module implements the ledger side of the account service:
//! - Balance mutations (opening balances and signed deltas)
//! - Transaction records derived from each non-zero delta
//! - Error types shared by every ledger operation

pub mod error;
pub mod mutation;
pub mod recorder;

#[cfg(test)]
mod mutation_props;

pub use error::LedgerError;
pub use mutation::{AccountMutation, AccountOpening, BalanceChange, BalanceMutationEngine};
pub use recorder::{Transaction, TransactionRecorder, TransactionType};
