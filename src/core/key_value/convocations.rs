//! Convocation athletes and convocation movements.
//!
//! Athletes are keyed by `(group_id, athlete_id)` and reconciled one group at a time.
//! Movements are limited to rows with a `convocation_group_id`. A record whose id
//! belongs to any other movement, or whose item id belongs to another movement's item,
//! is rejected with `InvalidRecord`. Each movement carries its `items`, which replace
//! the stored items wholesale. A record without a `category` gets the configured
//! convocation category.

use super::{
    StoreKey, SyncSummary, parse_record,
    records::{ConvocationAthleteRecord, MovementRecord},
};
use crate::{
    config::settings::BillingSettings,
    core::{calendar, new_id},
    entities::{
        ConvocationAthlete, Movement, MovementItem, convocation_athlete, movement, movement_item,
    },
    errors::{Error, Result},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

pub(super) async fn replace_athletes<C>(db: &C, rows: Vec<Value>) -> Result<SyncSummary>
where
    C: ConnectionTrait,
{
    let key = StoreKey::ConvocationAthletes;

    let mut by_group: BTreeMap<String, Vec<ConvocationAthleteRecord>> = BTreeMap::new();
    for row in rows {
        let record: ConvocationAthleteRecord = parse_record(key, row)?;
        by_group
            .entry(record.group_id.clone())
            .or_default()
            .push(record);
    }
    let group_ids: Vec<String> = by_group.keys().cloned().collect();

    let mut summary = SyncSummary::new(key);
    for (group_id, records) in by_group {
        let mut athlete_ids = Vec::with_capacity(records.len());
        for record in records {
            let pk = (group_id.clone(), record.athlete_id.clone());
            let exists = ConvocationAthlete::find_by_id(pk).one(db).await?.is_some();
            athlete_ids.push(record.athlete_id.clone());

            let active = record.into_active_model();
            if exists {
                active.update(db).await?;
                summary.updated += 1;
            } else {
                active.insert(db).await?;
                summary.inserted += 1;
            }
        }

        summary.deleted += ConvocationAthlete::delete_many()
            .filter(convocation_athlete::Column::GroupId.eq(group_id.as_str()))
            .filter(convocation_athlete::Column::AthleteId.is_not_in(athlete_ids))
            .exec(db)
            .await?
            .rows_affected;
    }

    summary.deleted += ConvocationAthlete::delete_many()
        .filter(convocation_athlete::Column::GroupId.is_not_in(group_ids))
        .exec(db)
        .await?
        .rows_affected;

    Ok(summary)
}

/// Convocation movements as JSON, each with an `items` array.
pub(super) async fn movements_json(db: &DatabaseConnection) -> Result<Value> {
    let movements = Movement::find()
        .filter(movement::Column::ConvocationGroupId.is_not_null())
        .order_by_asc(movement::Column::IssuedOn)
        .all(db)
        .await?;

    let ids: Vec<String> = movements.iter().map(|movement| movement.id.clone()).collect();
    let mut items_by_movement: HashMap<String, Vec<movement_item::Model>> = HashMap::new();
    for item in MovementItem::find()
        .filter(movement_item::Column::MovementId.is_in(ids))
        .all(db)
        .await?
    {
        items_by_movement
            .entry(item.movement_id.clone())
            .or_default()
            .push(item);
    }

    let mut rows = Vec::with_capacity(movements.len());
    for movement in movements {
        let items = items_by_movement.remove(&movement.id).unwrap_or_default();
        let mut row = serde_json::to_value(&movement)?;
        if let Some(object) = row.as_object_mut() {
            object.insert("items".to_string(), serde_json::to_value(items)?);
        }
        rows.push(row);
    }
    Ok(Value::Array(rows))
}

pub(super) async fn replace_movements<C>(
    db: &C,
    billing: &BillingSettings,
    rows: Vec<Value>,
) -> Result<SyncSummary>
where
    C: ConnectionTrait,
{
    let key = StoreKey::ConvocationMovements;
    let mut summary = SyncSummary::new(key);
    let mut kept = Vec::with_capacity(rows.len());

    for row in rows {
        let record: MovementRecord = parse_record(key, row)?;
        let id = record.id.clone().unwrap_or_else(new_id);
        let due_on = record
            .due_on
            .unwrap_or_else(|| calendar::due_date(record.issued_on, billing));

        let existing = Movement::find_by_id(id.clone()).one(db).await?;
        if existing
            .as_ref()
            .is_some_and(|movement| movement.convocation_group_id.is_none())
        {
            return Err(Error::InvalidRecord {
                key: key.as_str().to_string(),
                message: format!("movement {id} is not a convocation movement"),
            });
        }
        let exists = existing.is_some();
        let active =
            record.to_active_model(id.clone(), due_on, &billing.convocation_category);
        if exists {
            active.update(db).await?;
            summary.updated += 1;
        } else {
            active.insert(db).await?;
            summary.inserted += 1;
        }

        let mut item_ids = Vec::with_capacity(record.items.len());
        for item in &record.items {
            let item_id = item.id.clone().unwrap_or_else(new_id);
            let existing_item = MovementItem::find_by_id(item_id.clone()).one(db).await?;
            if let Some(other) = existing_item.as_ref().filter(|other| other.movement_id != id) {
                return Err(Error::InvalidRecord {
                    key: key.as_str().to_string(),
                    message: format!(
                        "item {item_id} belongs to movement {}, not {id}",
                        other.movement_id
                    ),
                });
            }
            let item_exists = existing_item.is_some();
            let active = item.to_active_model(item_id.clone(), id.clone());
            if item_exists {
                active.update(db).await?;
            } else {
                active.insert(db).await?;
            }
            item_ids.push(item_id);
        }

        MovementItem::delete_many()
            .filter(movement_item::Column::MovementId.eq(id.as_str()))
            .filter(movement_item::Column::Id.is_not_in(item_ids))
            .exec(db)
            .await?;

        kept.push(id);
    }

    let stale: Vec<String> = Movement::find()
        .filter(movement::Column::ConvocationGroupId.is_not_null())
        .filter(movement::Column::Id.is_not_in(kept))
        .all(db)
        .await?
        .into_iter()
        .map(|movement| movement.id)
        .collect();
    summary.deleted = delete_movements(db, stale).await?;

    Ok(summary)
}

/// Deletes every convocation movement and its items.
pub(super) async fn clear_movements<C>(db: &C) -> Result<u64>
where
    C: ConnectionTrait,
{
    let scoped: Vec<String> = Movement::find()
        .filter(movement::Column::ConvocationGroupId.is_not_null())
        .all(db)
        .await?
        .into_iter()
        .map(|movement| movement.id)
        .collect();
    delete_movements(db, scoped).await
}

async fn delete_movements<C>(db: &C, ids: Vec<String>) -> Result<u64>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(0);
    }

    MovementItem::delete_many()
        .filter(movement_item::Column::MovementId.is_in(ids.clone()))
        .exec(db)
        .await?;

    let deleted = Movement::delete_many()
        .filter(movement::Column::Id.is_in(ids))
        .exec(db)
        .await?
        .rows_affected;
    Ok(deleted)
}
