//! Movement entity - internal cost allocation, the counterpart of invoices for
//! event expenses.
//!
//! Convocation groups produce one movement per charged athlete plus one aggregate
//! movement (without a user) for the whole group. Those rows carry
//! `convocation_group_id` and are the rows synchronised under
//! `movimentos-convocatoria`.

use super::invoice::PaymentStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Movement database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Charged athlete, `None` for aggregate movements
    pub user_id: Option<String>,
    pub convocation_group_id: Option<String>,
    pub event_id: Option<String>,
    pub issued_on: Date,
    pub due_on: Date,
    pub total: f64,
    pub status: PaymentStatus,
    pub description: String,
    /// Ledger category, e.g. the configured convocation category
    pub category: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::convocation_group::Entity",
        from = "Column::ConvocationGroupId",
        to = "super::convocation_group::Column::Id",
        on_delete = "Cascade"
    )]
    ConvocationGroup,
    #[sea_orm(has_many = "super::movement_item::Entity")]
    Items,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::convocation_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConvocationGroup.def()
    }
}

impl Related<super::movement_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
