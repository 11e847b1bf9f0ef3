//! Initial database migration.
//!
//! Creates the enums, the users, investment_accounts and transactions tables,
//! and the constraints that back the ledger invariants.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TABLES
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(INVESTMENT_ACCOUNTS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 3: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Account categories: ACC1 view-only, ACC2 full CRUD, ACC3 create-only
CREATE TYPE account_type AS ENUM ('ACC1', 'ACC2', 'ACC3');

CREATE TYPE transaction_type AS ENUM ('Deposit', 'Withdrawal');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id              UUID PRIMARY KEY,
    username        VARCHAR(150) NOT NULL UNIQUE,
    email           VARCHAR(254),
    first_name      VARCHAR(150) NOT NULL DEFAULT '',
    last_name       VARCHAR(150) NOT NULL DEFAULT '',
    password_hash   VARCHAR(255) NOT NULL,
    is_staff        BOOLEAN NOT NULL DEFAULT FALSE,
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    date_joined     TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const INVESTMENT_ACCOUNTS_SQL: &str = r"
CREATE TABLE investment_accounts (
    id              UUID PRIMARY KEY,
    name            VARCHAR(100) NOT NULL,
    description     TEXT,
    balance         NUMERIC(10, 2) NOT NULL DEFAULT 0,
    account_type    account_type NOT NULL,
    owner_id        UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_balance_non_negative CHECK (balance >= 0)
);

CREATE INDEX idx_investment_accounts_owner ON investment_accounts(owner_id);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id                  UUID PRIMARY KEY,
    account_id          UUID NOT NULL REFERENCES investment_accounts(id) ON DELETE CASCADE,
    transaction_type    transaction_type NOT NULL,
    amount              NUMERIC(10, 2) NOT NULL,
    transaction_by      UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_amount_non_zero CHECK (amount <> 0),
    CONSTRAINT chk_amount_sign CHECK (
        (transaction_type = 'Deposit' AND amount > 0) OR
        (transaction_type = 'Withdrawal' AND amount < 0)
    )
);

CREATE INDEX idx_transactions_account_created ON transactions(account_id, created_at DESC);
CREATE INDEX idx_transactions_created ON transactions(created_at);
";

const TRIGGERS_SQL: &str = r"
-- Transactions are append-only
CREATE OR REPLACE FUNCTION prevent_transaction_update()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'transactions are immutable';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_transactions_immutable
    BEFORE UPDATE ON transactions
    FOR EACH ROW EXECUTE FUNCTION prevent_transaction_update();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_transactions_immutable ON transactions;
DROP FUNCTION IF EXISTS prevent_transaction_update();
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS investment_accounts;
DROP TABLE IF EXISTS users;
DROP TYPE IF EXISTS transaction_type;
DROP TYPE IF EXISTS account_type;
";
