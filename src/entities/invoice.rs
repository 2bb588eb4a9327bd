//! Invoice entity - member-facing billing issued by the cascades.
//!
//! Invoices are created by competition registrations and sales. Each invoice has
//! one or more [`super::invoice_item`] lines and a mirrored
//! [`super::financial_entry`] in the general ledger.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment state shared by invoices, movements and ledger entries
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Issued and awaiting payment
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Settled
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Voided
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Invoice database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Billed member
    pub user_id: String,
    pub issued_on: Date,
    /// Issue date plus the configured number of business days
    pub due_on: Date,
    /// Billing month as `YYYY-MM`
    pub reference_month: Option<String>,
    pub total: f64,
    pub status: PaymentStatus,
    /// Origin of the invoice: `"registration"` or `"sale"`
    pub kind: String,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::invoice_item::Entity")]
    Items,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::invoice_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
