//! Account repository: the Postgres-backed ledger store.
//!
//! Balance updates are a single conditional statement,
//! `UPDATE ... SET balance = balance + $delta WHERE id = $id AND balance + $delta >= 0`,
//! run in the same database transaction as the transaction-row insert.

use async_trait::async_trait;
use chrono::Utc;
use investa_core::account::InvestmentAccount;
use investa_core::ledger::{AccountMutation, LedgerError, Transaction};
use investa_core::reports::CreatedAtWindow;
use investa_core::store::{ACCOUNT_NOT_FOUND, LedgerStore};
use investa_shared::types::{AccountId, Money, TransactionId, UserId};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

use crate::entities::sea_orm_active_enums::{AccountType, TransactionType};
use crate::entities::{investment_accounts, transactions};

/// Maps a database error onto the ledger taxonomy.
fn persistence(err: DbErr) -> LedgerError {
    LedgerError::Persistence(err.to_string())
}

fn stored_money(amount: Decimal) -> Result<Money, LedgerError> {
    Money::new(amount).map_err(|e| LedgerError::Persistence(format!("stored amount {amount}: {e}")))
}

fn to_domain_account(model: investment_accounts::Model) -> Result<InvestmentAccount, LedgerError> {
    Ok(InvestmentAccount {
        id: AccountId::from_uuid(model.id),
        name: model.name,
        description: model.description,
        balance: stored_money(model.balance)?,
        account_type: model.account_type.into(),
        owner_id: UserId::from_uuid(model.owner_id),
    })
}

fn to_domain_transaction(model: transactions::Model) -> Result<Transaction, LedgerError> {
    Ok(Transaction {
        id: TransactionId::from_uuid(model.id),
        transaction_type: model.transaction_type.into(),
        amount: stored_money(model.amount)?,
        created_at: model.created_at.with_timezone(&Utc),
        transaction_by: UserId::from_uuid(model.transaction_by),
        account_id: AccountId::from_uuid(model.account_id),
    })
}

fn transaction_row(tx: &Transaction) -> transactions::ActiveModel {
    transactions::ActiveModel {
        id: Set(tx.id.into_inner()),
        account_id: Set(tx.account_id.into_inner()),
        transaction_type: Set(TransactionType::from(tx.transaction_type)),
        amount: Set(tx.amount.amount()),
        transaction_by: Set(tx.transaction_by.into_inner()),
        created_at: Set(tx.created_at.into()),
    }
}

/// Repository for investment accounts and their transactions.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model<C: ConnectionTrait>(
        conn: &C,
        id: AccountId,
    ) -> Result<Option<investment_accounts::Model>, LedgerError> {
        investment_accounts::Entity::find_by_id(id.into_inner())
            .one(conn)
            .await
            .map_err(persistence)
    }
}

#[async_trait]
impl LedgerStore for AccountRepository {
    async fn insert_account(
        &self,
        account: &InvestmentAccount,
        opening: Option<&Transaction>,
    ) -> Result<InvestmentAccount, LedgerError> {
        let txn = self.db.begin().await.map_err(persistence)?;
        let now = Utc::now().into();

        let model = investment_accounts::ActiveModel {
            id: Set(account.id.into_inner()),
            name: Set(account.name.clone()),
            description: Set(account.description.clone()),
            balance: Set(account.balance.amount()),
            account_type: Set(AccountType::from(account.account_type)),
            owner_id: Set(account.owner_id.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(persistence)?;

        if let Some(tx) = opening {
            transaction_row(tx).insert(&txn).await.map_err(persistence)?;
        }

        txn.commit().await.map_err(persistence)?;
        to_domain_account(model)
    }

    async fn find_account(&self, id: AccountId) -> Result<Option<InvestmentAccount>, LedgerError> {
        Self::find_model(&self.db, id)
            .await?
            .map(to_domain_account)
            .transpose()
    }

    async fn account_transactions(&self, id: AccountId) -> Result<Vec<Transaction>, LedgerError> {
        transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(id.into_inner()))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.db)
            .await
            .map_err(persistence)?
            .into_iter()
            .map(to_domain_transaction)
            .collect()
    }

    async fn commit_update(&self, mutation: &AccountMutation) -> Result<InvestmentAccount, LedgerError> {
        let delta = mutation.delta().amount();
        let txn = self.db.begin().await.map_err(persistence)?;

        let mut update = investment_accounts::Entity::update_many()
            .col_expr(
                investment_accounts::Column::Balance,
                Expr::col(investment_accounts::Column::Balance).add(delta),
            )
            .col_expr(
                investment_accounts::Column::UpdatedAt,
                Expr::value(Utc::now()),
            );
        if let Some(name) = &mutation.name {
            update = update.col_expr(investment_accounts::Column::Name, Expr::value(name.clone()));
        }
        if let Some(description) = &mutation.description {
            update = update.col_expr(
                investment_accounts::Column::Description,
                Expr::value(description.clone()),
            );
        }
        if let Some(account_type) = mutation.account_type {
            update = update.col_expr(
                investment_accounts::Column::AccountType,
                Expr::val(account_type.code()).as_enum(Alias::new("account_type")),
            );
        }

        let result = update
            .filter(investment_accounts::Column::Id.eq(mutation.account_id.into_inner()))
            .filter(Expr::expr(Expr::col(investment_accounts::Column::Balance).add(delta)).gte(Decimal::ZERO))
            .exec(&txn)
            .await
            .map_err(persistence)?;

        if result.rows_affected == 0 {
            let current = Self::find_model(&txn, mutation.account_id).await?;
            txn.rollback().await.map_err(persistence)?;
            return Err(match current {
                None => LedgerError::NotFound(ACCOUNT_NOT_FOUND.to_string()),
                Some(model) => {
                    debug!(account_id = %mutation.account_id, %delta, "conditional update refused");
                    LedgerError::InsufficientFunds {
                        balance: model.balance,
                        requested: delta,
                    }
                }
            });
        }

        // The row lock taken by the update orders commits on this account.
        if let Some(tx) = mutation.stamped(Utc::now()) {
            transaction_row(&tx).insert(&txn).await.map_err(persistence)?;
        }

        let updated = Self::find_model(&txn, mutation.account_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(ACCOUNT_NOT_FOUND.to_string()))?;
        txn.commit().await.map_err(persistence)?;
        to_domain_account(updated)
    }

    async fn delete_account(&self, id: AccountId) -> Result<bool, LedgerError> {
        let result = investment_accounts::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(persistence)?;
        Ok(result.rows_affected > 0)
    }

    async fn accounts_for_owner(&self, owner: UserId) -> Result<Vec<InvestmentAccount>, LedgerError> {
        investment_accounts::Entity::find()
            .filter(investment_accounts::Column::OwnerId.eq(owner.into_inner()))
            .order_by_asc(investment_accounts::Column::Id)
            .all(&self.db)
            .await
            .map_err(persistence)?
            .into_iter()
            .map(to_domain_account)
            .collect()
    }

    async fn transactions_for_accounts(
        &self,
        accounts: &[AccountId],
        window: Option<CreatedAtWindow>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        if accounts.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = transactions::Entity::find().filter(
            transactions::Column::AccountId.is_in(accounts.iter().copied().map(AccountId::into_inner)),
        );
        if let Some(window) = window {
            query = query
                .filter(transactions::Column::CreatedAt.gte(window.not_before))
                .filter(transactions::Column::CreatedAt.lte(window.not_after));
        }

        query
            .order_by_asc(transactions::Column::CreatedAt)
            .order_by_asc(transactions::Column::Id)
            .all(&self.db)
            .await
            .map_err(persistence)?
            .into_iter()
            .map(to_domain_transaction)
            .collect()
    }
}
