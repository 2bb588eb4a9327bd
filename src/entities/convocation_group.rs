//! Convocation group entity - a roster of athletes called up for an event.
//!
//! The roster is stored as a JSON array of user ids. Fee columns override the
//! event's convocation rates; `movement_id` holds the aggregate movement created
//! when the group's costs were allocated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Convocation group database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "convocation_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub event_id: String,
    pub name: String,
    /// JSON array of athlete (user) ids
    pub athlete_ids: Json,
    pub issued_on: Date,
    pub base_fee: Option<f64>,
    pub race_fee: Option<f64>,
    pub jump_fee: Option<f64>,
    pub relay_fee: Option<f64>,
    /// Aggregate movement for the group's total cost
    pub movement_id: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,
    #[sea_orm(
        belongs_to = "super::movement::Entity",
        from = "Column::MovementId",
        to = "super::movement::Column::Id",
        on_delete = "SetNull"
    )]
    AggregateMovement,
    #[sea_orm(has_many = "super::convocation_athlete::Entity")]
    Athletes,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::convocation_athlete::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Athletes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
