//! Report types and date-window parsing.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::AccountType;
use crate::ledger::{LedgerError, Transaction};

/// `to` value of a report that is not limited by an end date.
pub const ALL_TRANSACTIONS: &str = "All Transactions";

/// Accepted date format for `start_date` and `end_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Query parameters of a report request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    /// Upper reference date, defaults to today.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Lower reference date.
    #[serde(default)]
    pub end_date: Option<String>,
}

impl ReportQuery {
    /// The start date, treating an empty value as absent.
    #[must_use]
    pub fn start_date(&self) -> Option<&str> {
        self.start_date.as_deref().filter(|s| !s.is_empty())
    }

    /// The end date, treating an empty value as absent.
    #[must_use]
    pub fn end_date(&self) -> Option<&str> {
        self.end_date.as_deref().filter(|s| !s.is_empty())
    }
}

/// A transaction annotated with its account's type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTransaction {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// Type of the account the transaction belongs to.
    pub account_type: AccountType,
}

/// Per-user report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReport {
    /// Reported user's name.
    pub username: String,
    /// Sum of the balances of all the user's accounts.
    pub total_balance: Decimal,
    /// Transactions on the user's accounts, oldest first.
    pub transactions: Vec<ReportTransaction>,
    /// Start date as given or defaulted.
    pub from: String,
    /// End date, or [`ALL_TRANSACTIONS`].
    pub to: String,
}

/// Inclusive `created_at` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedAtWindow {
    /// Earliest timestamp included.
    pub not_before: DateTime<Utc>,
    /// Latest timestamp included.
    pub not_after: DateTime<Utc>,
}

impl CreatedAtWindow {
    /// Whether `ts` falls inside the window.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.not_before <= ts && ts <= self.not_after
    }
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `LedgerError::InvalidDateRange` for any other format.
pub fn parse_report_date(field: &str, raw: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        LedgerError::InvalidDateRange(format!(
            "{field}: Date has wrong format. Use one of these formats instead: YYYY-MM-DD."
        ))
    })
}

/// Builds the filter window for a report with both dates.
///
/// `start_date` is the upper bound and `end_date` the lower bound, each taken
/// at 23:59:59 UTC, so `start=2024-06-30, end=2024-06-01` covers June 2nd
/// through June 30th.
///
/// # Errors
///
/// Returns `LedgerError::InvalidDateRange` if either date is malformed.
pub fn report_window(start_date: &str, end_date: &str) -> Result<CreatedAtWindow, LedgerError> {
    let start = parse_report_date("start_date", start_date)?;
    let end = parse_report_date("end_date", end_date)?;
    Ok(CreatedAtWindow {
        not_before: end_of_day(end),
        not_after: end_of_day(start),
    })
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let close = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    date.and_time(close).and_utc()
}
