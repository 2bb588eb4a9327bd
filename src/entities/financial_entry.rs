//! Financial entry entity - general ledger lines used for accounting reconciliation.

use super::invoice::PaymentStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a ledger line
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Financial entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub entry_date: Date,
    pub description: String,
    pub kind: EntryKind,
    pub amount: f64,
    /// Accounting category (e.g. "inscricoes", "vendas")
    pub category: Option<String>,
    pub user_id: Option<String>,
    /// Invoice this entry mirrors, if any
    pub invoice_id: Option<String>,
    pub status: PaymentStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id",
        on_delete = "SetNull"
    )]
    Invoice,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
