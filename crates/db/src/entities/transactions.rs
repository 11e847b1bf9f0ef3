//! `SeaORM` Entity for transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransactionType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub transaction_type: TransactionType,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,
    pub transaction_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::investment_accounts::Entity",
        from = "Column::AccountId",
        to = "super::investment_accounts::Column::Id",
        on_delete = "Cascade"
    )]
    InvestmentAccounts,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TransactionBy",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::investment_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvestmentAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
