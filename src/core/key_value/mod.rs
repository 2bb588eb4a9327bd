//! Key-value reconciliation service.
//!
//! A fixed allow-list of string keys ([`StoreKey`]) maps onto club tables. A key's value
//! is always the JSON array of every row in its table:
//!
//! - [`get`] reads the whole table.
//! - [`set`] makes the table equal to the incoming array. Records are upserted by id and
//!   every row missing from the array is deleted.
//! - [`delete`] empties the table.
//!
//! `set` treats anything that is not an array as an empty array, so it clears the table.
//! Callers that send a partial list lose the rows they left out.

mod convocations;
mod records;
mod tables;

use crate::{
    config::settings::BillingSettings,
    core::new_id,
    entities::{
        Attendance, CompetitionResult, Convocation, ConvocationAthlete, ConvocationGroup, Event,
        EventType, RaceResult, attendance, convocation, convocation_athlete, convocation_group,
        event_type, race_result, result,
    },
    errors::{Error, Result},
};
use records::{
    AttendanceRecord, ConvocationRecord, EventTypeRecord, RaceResultRecord, ResultRecord,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// The keys the service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum StoreKey {
    Events,
    EventTypes,
    Attendances,
    Results,
    RaceResults,
    Convocations,
    ConvocationGroups,
    ConvocationAthletes,
    ConvocationMovements,
}

impl StoreKey {
    /// Every supported key, in table dependency order.
    pub const ALL: [Self; 9] = [
        Self::EventTypes,
        Self::Events,
        Self::Attendances,
        Self::Results,
        Self::RaceResults,
        Self::Convocations,
        Self::ConvocationGroups,
        Self::ConvocationAthletes,
        Self::ConvocationMovements,
    ];

    /// Parses a raw key. Returns `None` for keys outside the allow-list.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == key)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Events => "club-events",
            Self::EventTypes => "club-eventos-tipos",
            Self::Attendances => "club-presencas",
            Self::Results => "club-resultados",
            Self::RaceResults => "club-resultados-provas",
            Self::Convocations => "club-convocatorias",
            Self::ConvocationGroups => "club-convocatorias-grupo",
            Self::ConvocationAthletes => "club-convocatorias-atleta",
            Self::ConvocationMovements => "movimentos-convocatoria",
        }
    }
}

impl From<StoreKey> for &'static str {
    fn from(key: StoreKey) -> Self {
        key.as_str()
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a [`set`] or [`delete`] call changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub key: StoreKey,
    pub inserted: usize,
    pub updated: usize,
    pub deleted: u64,
}

impl SyncSummary {
    const fn new(key: StoreKey) -> Self {
        Self {
            key,
            inserted: 0,
            updated: 0,
            deleted: 0,
        }
    }
}

/// Upserts every record by id, then deletes the rows whose id was not sent.
macro_rules! replace_table {
    ($db:expr, $key:expr, $rows:expr, $record:ty, $entity:ty, $id_column:expr) => {{
        let mut summary = SyncSummary::new($key);
        let mut kept: Vec<String> = Vec::new();
        for row in $rows {
            let record: $record = parse_record($key, row)?;
            let id = record.id.clone().unwrap_or_else(new_id);
            let exists = <$entity>::find_by_id(id.clone()).one($db).await?.is_some();
            let active = record.into_active_model(id.clone());
            if exists {
                active.update($db).await?;
                summary.updated += 1;
            } else {
                active.insert($db).await?;
                summary.inserted += 1;
            }
            kept.push(id);
        }
        summary.deleted = <$entity>::delete_many()
            .filter($id_column.is_not_in(kept))
            .exec($db)
            .await?
            .rows_affected;
        summary
    }};
}

/// Reads the whole table behind `key` as a JSON array.
///
/// Returns `Ok(None)` for unsupported keys.
#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, key: &str) -> Result<Option<Value>> {
    let Some(key) = StoreKey::parse(key) else {
        debug!("Unsupported key. Ignoring.");
        return Ok(None);
    };

    let value = match key {
        StoreKey::Events => tables::events_json(db).await?,
        StoreKey::EventTypes => serde_json::to_value(
            EventType::find()
                .order_by_asc(event_type::Column::Name)
                .all(db)
                .await?,
        )?,
        StoreKey::Attendances => serde_json::to_value(
            Attendance::find()
                .order_by_asc(attendance::Column::AttendedOn)
                .all(db)
                .await?,
        )?,
        StoreKey::Results => serde_json::to_value(
            CompetitionResult::find()
                .order_by_asc(result::Column::EventId)
                .order_by_asc(result::Column::Position)
                .all(db)
                .await?,
        )?,
        StoreKey::RaceResults => serde_json::to_value(
            RaceResult::find()
                .order_by_asc(race_result::Column::RaceId)
                .order_by_asc(race_result::Column::Position)
                .all(db)
                .await?,
        )?,
        StoreKey::Convocations => serde_json::to_value(
            Convocation::find()
                .order_by_asc(convocation::Column::EventId)
                .all(db)
                .await?,
        )?,
        StoreKey::ConvocationGroups => serde_json::to_value(
            ConvocationGroup::find()
                .order_by_asc(convocation_group::Column::IssuedOn)
                .all(db)
                .await?,
        )?,
        StoreKey::ConvocationAthletes => serde_json::to_value(
            ConvocationAthlete::find()
                .order_by_asc(convocation_athlete::Column::GroupId)
                .order_by_asc(convocation_athlete::Column::AthleteId)
                .all(db)
                .await?,
        )?,
        StoreKey::ConvocationMovements => convocations::movements_json(db).await?,
    };

    Ok(Some(value))
}

/// Replaces the table behind `key` with `value` inside one transaction.
///
/// `actor` is the user recorded as creator of events that carry no `created_by`.
/// Returns `Ok(None)` for unsupported keys.
///
/// # Errors
/// Returns an error if:
/// - A record cannot be parsed (`InvalidRecord`); nothing is written
/// - `key` is `club-events` and `actor` is not an existing user
/// - Any database write fails; nothing is written
#[instrument(skip(db, billing, value))]
pub async fn set(
    db: &DatabaseConnection,
    billing: &BillingSettings,
    key: &str,
    value: Value,
    actor: &str,
) -> Result<Option<SyncSummary>> {
    let Some(key) = StoreKey::parse(key) else {
        debug!("Unsupported key. Ignoring.");
        return Ok(None);
    };

    let rows = incoming_rows(key, value);
    let txn = db.begin().await?;

    let summary = match key {
        StoreKey::Events => tables::replace_events(&txn, rows, actor).await?,
        StoreKey::EventTypes => replace_table!(
            &txn,
            key,
            rows,
            EventTypeRecord,
            EventType,
            event_type::Column::Id
        ),
        StoreKey::Attendances => replace_table!(
            &txn,
            key,
            rows,
            AttendanceRecord,
            Attendance,
            attendance::Column::Id
        ),
        StoreKey::Results => replace_table!(
            &txn,
            key,
            rows,
            ResultRecord,
            CompetitionResult,
            result::Column::Id
        ),
        StoreKey::RaceResults => replace_table!(
            &txn,
            key,
            rows,
            RaceResultRecord,
            RaceResult,
            race_result::Column::Id
        ),
        StoreKey::Convocations => replace_table!(
            &txn,
            key,
            rows,
            ConvocationRecord,
            Convocation,
            convocation::Column::Id
        ),
        StoreKey::ConvocationGroups => {
            tables::replace_convocation_groups(&txn, billing, rows).await?
        }
        StoreKey::ConvocationAthletes => convocations::replace_athletes(&txn, rows).await?,
        StoreKey::ConvocationMovements => {
            convocations::replace_movements(&txn, billing, rows).await?
        }
    };

    txn.commit().await?;

    info!(
        "Synchronised '{}': {} inserted, {} updated, {} deleted",
        key, summary.inserted, summary.updated, summary.deleted
    );
    Ok(Some(summary))
}

/// Deletes every row behind `key` inside one transaction.
///
/// Returns `Ok(None)` for unsupported keys.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, key: &str) -> Result<Option<SyncSummary>> {
    let Some(key) = StoreKey::parse(key) else {
        debug!("Unsupported key. Ignoring.");
        return Ok(None);
    };

    let txn = db.begin().await?;

    let deleted = match key {
        StoreKey::Events => Event::delete_many().exec(&txn).await?.rows_affected,
        StoreKey::EventTypes => EventType::delete_many().exec(&txn).await?.rows_affected,
        StoreKey::Attendances => Attendance::delete_many().exec(&txn).await?.rows_affected,
        StoreKey::Results => CompetitionResult::delete_many().exec(&txn).await?.rows_affected,
        StoreKey::RaceResults => RaceResult::delete_many().exec(&txn).await?.rows_affected,
        StoreKey::Convocations => Convocation::delete_many().exec(&txn).await?.rows_affected,
        StoreKey::ConvocationGroups => {
            ConvocationGroup::delete_many().exec(&txn).await?.rows_affected
        }
        StoreKey::ConvocationAthletes => {
            ConvocationAthlete::delete_many().exec(&txn).await?.rows_affected
        }
        StoreKey::ConvocationMovements => convocations::clear_movements(&txn).await?,
    };

    txn.commit().await?;

    info!("Cleared '{}': {} rows deleted", key, deleted);
    Ok(Some(SyncSummary {
        deleted,
        ..SyncSummary::new(key)
    }))
}

fn incoming_rows(key: StoreKey, value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        other => {
            warn!(
                "Value for '{}' is not an array ({}). Treating it as empty; every row will be deleted.",
                key,
                json_kind(&other)
            );
            Vec::new()
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_record<T: DeserializeOwned>(key: StoreKey, row: Value) -> Result<T> {
    serde_json::from_value(row).map_err(|e| Error::InvalidRecord {
        key: key.as_str().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests;
