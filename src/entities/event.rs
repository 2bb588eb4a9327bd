//! Event entity - competitions, trainings and other club calendar entries.
//!
//! Besides its calendar data an event carries the default fees used by the billing
//! cascades: `registration_fee` for competition registrations, and the four
//! convocation rates used when a convocation group is created.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Unique identifier (UUID text)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Optional classification, see [`super::event_type`]
    pub event_type_id: Option<String>,
    /// First day of the event
    pub starts_on: Date,
    pub ends_on: Option<Date>,
    pub start_time: Option<Time>,
    pub location: Option<String>,
    /// Default fee charged per competition registration
    pub registration_fee: Option<f64>,
    /// Base cost per convoked athlete
    pub convocation_fee: Option<f64>,
    /// Cost per individual race
    pub race_fee: Option<f64>,
    /// Cost per jump, counted against the individual races
    pub jump_fee: Option<f64>,
    /// Cost per relay
    pub relay_fee: Option<f64>,
    /// User who created the event
    pub created_by: String,
    pub created_at: DateTime,
}

/// Defines relationships between Event and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event_type::Entity",
        from = "Column::EventTypeId",
        to = "super::event_type::Column::Id",
        on_delete = "SetNull"
    )]
    EventType,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,
    /// One event has many competitions
    #[sea_orm(has_many = "super::competition::Entity")]
    Competitions,
}

impl Related<super::event_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventType.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::competition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Competitions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
