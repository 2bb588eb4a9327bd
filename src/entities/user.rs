//! User entity - club members and athletes.
//!
//! Users are referenced by registrations, convocations, invoices and movements.
//! The `age_group` column holds the escalão the athlete competes in.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier (UUID text)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Contact email, if known
    pub email: Option<String>,
    /// Club membership number
    pub member_number: Option<String>,
    /// Age-group category (escalão)
    pub age_group: Option<String>,
    /// Whether the member is currently active
    pub active: bool,
    /// When the user was created
    pub created_at: DateTime,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One athlete has many competition registrations
    #[sea_orm(has_many = "super::competition_registration::Entity")]
    Registrations,
}

impl Related<super::competition_registration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
