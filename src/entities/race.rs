//! Race entity (prova) - a single heat or relay within a competition.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Race database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "races")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub competition_id: String,
    /// Race label (e.g. "100m Livres")
    pub name: String,
    /// Distance in meters
    pub distance: Option<i32>,
    pub style: Option<String>,
    pub gender: Option<String>,
    pub age_group: Option<String>,
    /// Relays are priced separately from individual races
    pub is_relay: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::competition::Entity",
        from = "Column::CompetitionId",
        to = "super::competition::Column::Id",
        on_delete = "Cascade"
    )]
    Competition,
    #[sea_orm(has_many = "super::competition_registration::Entity")]
    Registrations,
}

impl Related<super::competition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Competition.def()
    }
}

impl Related<super::competition_registration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
