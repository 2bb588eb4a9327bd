//! Tables whose synchronisation does more than a plain upsert: events resolve
//! their creator and format start times, and new convocation groups allocate costs.

use super::{
    StoreKey, SyncSummary, parse_record,
    records::{ConvocationGroupRecord, EventRecord},
};
use crate::{
    config::settings::BillingSettings,
    core::{
        convocation::allocate_convocation_costs,
        new_id,
        user::{get_user_by_id, require_user},
    },
    entities::{ConvocationGroup, Event, convocation_group, event},
    errors::Result,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use serde_json::Value;
use tracing::debug;

/// Events as JSON, with `start_time` rendered as `HH:MM`.
pub(super) async fn events_json(db: &DatabaseConnection) -> Result<Value> {
    let events = Event::find()
        .order_by_asc(event::Column::StartsOn)
        .all(db)
        .await?;

    let mut rows = Vec::with_capacity(events.len());
    for event in events {
        let mut row = serde_json::to_value(&event)?;
        if let (Some(time), Some(object)) = (event.start_time, row.as_object_mut()) {
            object.insert(
                "start_time".to_string(),
                Value::String(time.format("%H:%M").to_string()),
            );
        }
        rows.push(row);
    }
    Ok(Value::Array(rows))
}

pub(super) async fn replace_events<C>(db: &C, rows: Vec<Value>, actor: &str) -> Result<SyncSummary>
where
    C: ConnectionTrait,
{
    let key = StoreKey::Events;
    let actor = require_user(db, actor).await?;

    let mut summary = SyncSummary::new(key);
    let mut kept = Vec::with_capacity(rows.len());

    for row in rows {
        let record: EventRecord = parse_record(key, row)?;
        let id = record.id.clone().unwrap_or_else(new_id);

        let created_by = match record.created_by.clone() {
            Some(user_id) => {
                if get_user_by_id(db, &user_id).await?.is_some() {
                    user_id
                } else {
                    debug!("Creator {} does not exist. Using {}.", user_id, actor.id);
                    actor.id.clone()
                }
            }
            None => actor.id.clone(),
        };

        let exists = Event::find_by_id(id.clone()).one(db).await?.is_some();
        let mut active = record.into_active_model(id.clone(), created_by)?;
        if exists {
            active.update(db).await?;
            summary.updated += 1;
        } else {
            active.created_at = Set(chrono::Utc::now().naive_utc());
            active.insert(db).await?;
            summary.inserted += 1;
        }
        kept.push(id);
    }

    summary.deleted = Event::delete_many()
        .filter(event::Column::Id.is_not_in(kept))
        .exec(db)
        .await?
        .rows_affected;
    Ok(summary)
}

pub(super) async fn replace_convocation_groups<C>(
    db: &C,
    billing: &BillingSettings,
    rows: Vec<Value>,
) -> Result<SyncSummary>
where
    C: ConnectionTrait,
{
    let key = StoreKey::ConvocationGroups;
    let mut summary = SyncSummary::new(key);
    let mut kept = Vec::with_capacity(rows.len());

    for row in rows {
        let record: ConvocationGroupRecord = parse_record(key, row)?;
        let id = record.id.clone().unwrap_or_else(new_id);

        let existing = ConvocationGroup::find_by_id(id.clone()).one(db).await?;
        let mut active = record.into_active_model(id.clone());
        if let Some(existing) = existing {
            // Keep the allocation marker
            if matches!(active.movement_id, ActiveValue::Set(None)) {
                active.movement_id = Set(existing.movement_id);
            }
            active.update(db).await?;
            summary.updated += 1;
        } else {
            active.created_at = Set(chrono::Utc::now().naive_utc());
            let group = active.insert(db).await?;
            allocate_convocation_costs(db, billing, group).await?;
            summary.inserted += 1;
        }
        kept.push(id);
    }

    summary.deleted = ConvocationGroup::delete_many()
        .filter(convocation_group::Column::Id.is_not_in(kept))
        .exec(db)
        .await?
        .rows_affected;
    Ok(summary)
}
