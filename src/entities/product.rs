//! Product entity - stock items sold by the club (caps, swimsuits, goggles).
//!
//! Stock is decremented by every sale without a floor, so it can go negative when
//! the club oversells.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Name of the product (e.g., "Touca", "Óculos")
    pub name: String,
    /// Default unit price
    pub price: f64,
    /// Units on hand
    pub stock: i32,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product has many sales
    #[sea_orm(has_many = "super::sale::Entity")]
    Sales,
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
