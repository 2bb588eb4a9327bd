//! Event type entity - the catalogue behind `club-eventos-tipos`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Type name (e.g. "Prova", "Treino")
    #[sea_orm(unique)]
    pub name: String,
    pub category: Option<String>,
    /// Calendar color as a hex string
    pub color: Option<String>,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event::Entity")]
    Events,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
