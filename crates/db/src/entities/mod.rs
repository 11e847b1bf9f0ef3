//! `SeaORM` entity definitions.

pub mod investment_accounts;
pub mod sea_orm_active_enums;
pub mod transactions;
pub mod users;

pub mod prelude {
    //! Entity re-exports.
    pub use super::investment_accounts::Entity as InvestmentAccounts;
    pub use super::transactions::Entity as Transactions;
    pub use super::users::Entity as Users;
}
