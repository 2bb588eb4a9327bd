//! Convocation athlete entity - per-athlete details inside a convocation group.
//!
//! Keyed by `(group_id, athlete_id)`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Convocation athlete database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "convocation_athletes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub athlete_id: String,
    /// JSON array of race ids the athlete is convoked for
    pub races: Json,
    pub confirmed: bool,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::convocation_group::Entity",
        from = "Column::GroupId",
        to = "super::convocation_group::Column::Id",
        on_delete = "Cascade"
    )]
    Group,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AthleteId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Athlete,
}

impl Related<super::convocation_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Athlete.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
