//! Admin report service.
//!
//! Only staff may request a report. A report without an end date is served
//! from cache when one exists; the cached entry is not keyed by start date,
//! so any cached open-ended report for the user is returned as is. Dates are
//! only parsed when an end date bounds the report.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use investa_shared::types::{AccountId, UserId};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use super::types::{
    ALL_TRANSACTIONS, DATE_FORMAT, ReportQuery, ReportTransaction, UserReport, report_window,
};
use crate::account::AccountType;
use crate::cache::{AccountCache, CacheKey, CachedValue};
use crate::ledger::LedgerError;
use crate::policy::Principal;
use crate::store::{LedgerStore, USER_NOT_FOUND, UserStore};

/// Builds per-user reports for staff.
#[derive(Clone)]
pub struct AdminReportService {
    ledger: Arc<dyn LedgerStore>,
    users: Arc<dyn UserStore>,
    cache: Arc<dyn AccountCache>,
    ttl: Duration,
}

impl std::fmt::Debug for AdminReportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminReportService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl AdminReportService {
    /// Creates a new report service.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        users: Arc<dyn UserStore>,
        cache: Arc<dyn AccountCache>,
        ttl: Duration,
    ) -> Self {
        Self {
            ledger,
            users,
            cache,
            ttl,
        }
    }

    /// Produces the report for `user_id`.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` for non-staff, `NotFound` for an unknown user,
    /// `InvalidDateRange` for malformed dates, `Persistence` on store failure.
    #[instrument(skip(self, query), fields(requester = %requester.user_id))]
    pub async fn report(
        &self,
        requester: &Principal,
        user_id: UserId,
        query: &ReportQuery,
    ) -> Result<UserReport, LedgerError> {
        if !requester.is_staff {
            warn!("report requested by non-staff user");
            return Err(LedgerError::permission_denied());
        }

        let end_date = query.end_date();
        let key = CacheKey::User(user_id);

        if end_date.is_none()
            && let Some(cached) = self.cache.get(&key)
            && let CachedValue::Report(report) = cached.as_ref()
        {
            debug!(%key, "cache hit");
            return Ok(report.clone());
        }

        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(USER_NOT_FOUND.to_string()))?;

        let start_date = query
            .start_date()
            .map_or_else(|| Utc::now().date_naive().format(DATE_FORMAT).to_string(), str::to_string);
        let window = end_date
            .map(|end| report_window(&start_date, end))
            .transpose()?;

        let accounts = self.ledger.accounts_for_owner(user_id).await?;
        let total_balance = accounts
            .iter()
            .fold(Decimal::new(0, 2), |sum, account| sum + account.balance.amount());
        let types: HashMap<AccountId, AccountType> =
            accounts.iter().map(|a| (a.id, a.account_type)).collect();
        let ids: Vec<AccountId> = accounts.iter().map(|a| a.id).collect();

        let transactions = self
            .ledger
            .transactions_for_accounts(&ids, window)
            .await?
            .into_iter()
            .filter_map(|transaction| {
                types
                    .get(&transaction.account_id)
                    .copied()
                    .map(|account_type| ReportTransaction {
                        transaction,
                        account_type,
                    })
            })
            .collect::<Vec<_>>();

        let report = UserReport {
            username: user.username,
            total_balance,
            transactions,
            from: start_date,
            to: end_date.map_or_else(|| ALL_TRANSACTIONS.to_string(), str::to_string),
        };

        if end_date.is_none() {
            self.cache
                .set(key, CachedValue::Report(report.clone()), self.ttl);
        }
        info!(
            user_id = %user_id,
            accounts = ids.len(),
            transactions = report.transactions.len(),
            "report generated"
        );
        Ok(report)
    }
}
