//! Competition registration entity - an athlete entered in a race.
//!
//! Creating a registration bills the athlete once; `invoice_id` records the invoice
//! that was issued and guards against billing twice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Competition registration database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "competition_registrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub race_id: String,
    pub athlete_id: String,
    /// Registration-specific fee, overrides the event's `registration_fee`
    pub fee: Option<f64>,
    /// Invoice issued for this registration, if any
    pub invoice_id: Option<String>,
    pub registered_on: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::race::Entity",
        from = "Column::RaceId",
        to = "super::race::Column::Id",
        on_delete = "Cascade"
    )]
    Race,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AthleteId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Athlete,
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id",
        on_delete = "SetNull"
    )]
    Invoice,
}

impl Related<super::race::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Race.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Athlete.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
