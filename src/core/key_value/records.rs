//! Incoming record shapes accepted by [`super::set`].
//!
//! Records mirror the table columns with every non-key column optional where the
//! table allows it. `id` may be omitted, in which case a new one is generated.

use crate::{
    entities::{
        PaymentStatus, attendance, convocation, convocation_athlete, convocation_group, event,
        event_type, movement, movement_item, race_result, result,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::Set;
use serde::Deserialize;

use super::StoreKey;

#[derive(Debug, Deserialize)]
pub(super) struct EventRecord {
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub event_type_id: Option<String>,
    pub starts_on: NaiveDate,
    #[serde(default)]
    pub ends_on: Option<NaiveDate>,
    /// `HH:MM` or `HH:MM:SS`
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub registration_fee: Option<f64>,
    #[serde(default)]
    pub convocation_fee: Option<f64>,
    #[serde(default)]
    pub race_fee: Option<f64>,
    #[serde(default)]
    pub jump_fee: Option<f64>,
    #[serde(default)]
    pub relay_fee: Option<f64>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl EventRecord {
    /// Builds the row. `created_at` is left unset for the caller to fill on insert.
    pub fn into_active_model(self, id: String, created_by: String) -> Result<event::ActiveModel> {
        let start_time = self
            .start_time
            .as_deref()
            .filter(|time| !time.is_empty())
            .map(parse_time)
            .transpose()?;

        Ok(event::ActiveModel {
            id: Set(id),
            title: Set(self.title),
            description: Set(self.description),
            event_type_id: Set(self.event_type_id),
            starts_on: Set(self.starts_on),
            ends_on: Set(self.ends_on),
            start_time: Set(start_time),
            location: Set(self.location),
            registration_fee: Set(self.registration_fee),
            convocation_fee: Set(self.convocation_fee),
            race_fee: Set(self.race_fee),
            jump_fee: Set(self.jump_fee),
            relay_fee: Set(self.relay_fee),
            created_by: Set(created_by),
            ..Default::default()
        })
    }
}

fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|e| Error::InvalidRecord {
            key: StoreKey::Events.as_str().to_string(),
            message: format!("invalid start_time '{value}': {e}"),
        })
}

#[derive(Debug, Deserialize)]
pub(super) struct EventTypeRecord {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl EventTypeRecord {
    pub fn into_active_model(self, id: String) -> event_type::ActiveModel {
        event_type::ActiveModel {
            id: Set(id),
            name: Set(self.name),
            category: Set(self.category),
            color: Set(self.color),
            active: Set(self.active),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AttendanceRecord {
    pub id: Option<String>,
    pub user_id: String,
    pub event_id: String,
    pub attended_on: NaiveDate,
    #[serde(default = "default_attendance_status")]
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AttendanceRecord {
    pub fn into_active_model(self, id: String) -> attendance::ActiveModel {
        attendance::ActiveModel {
            id: Set(id),
            user_id: Set(self.user_id),
            event_id: Set(self.event_id),
            attended_on: Set(self.attended_on),
            status: Set(self.status),
            notes: Set(self.notes),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ResultRecord {
    pub id: Option<String>,
    pub athlete_id: String,
    pub event_id: String,
    #[serde(default)]
    pub race_name: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ResultRecord {
    pub fn into_active_model(self, id: String) -> result::ActiveModel {
        result::ActiveModel {
            id: Set(id),
            athlete_id: Set(self.athlete_id),
            event_id: Set(self.event_id),
            race_name: Set(self.race_name),
            position: Set(self.position),
            time: Set(self.time),
            notes: Set(self.notes),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RaceResultRecord {
    pub id: Option<String>,
    pub race_id: String,
    pub athlete_id: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub points: Option<f64>,
}

impl RaceResultRecord {
    pub fn into_active_model(self, id: String) -> race_result::ActiveModel {
        race_result::ActiveModel {
            id: Set(id),
            race_id: Set(self.race_id),
            athlete_id: Set(self.athlete_id),
            time: Set(self.time),
            position: Set(self.position),
            points: Set(self.points),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ConvocationRecord {
    pub id: Option<String>,
    pub event_id: String,
    pub athlete_id: String,
    #[serde(default = "default_convocation_status")]
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ConvocationRecord {
    pub fn into_active_model(self, id: String) -> convocation::ActiveModel {
        convocation::ActiveModel {
            id: Set(id),
            event_id: Set(self.event_id),
            athlete_id: Set(self.athlete_id),
            status: Set(self.status),
            notes: Set(self.notes),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ConvocationGroupRecord {
    pub id: Option<String>,
    pub event_id: String,
    pub name: String,
    #[serde(default)]
    pub athlete_ids: Vec<String>,
    pub issued_on: NaiveDate,
    #[serde(default)]
    pub base_fee: Option<f64>,
    #[serde(default)]
    pub race_fee: Option<f64>,
    #[serde(default)]
    pub jump_fee: Option<f64>,
    #[serde(default)]
    pub relay_fee: Option<f64>,
    #[serde(default)]
    pub movement_id: Option<String>,
}

impl ConvocationGroupRecord {
    /// Builds the row. `created_at` is left unset for the caller to fill on insert.
    pub fn into_active_model(self, id: String) -> convocation_group::ActiveModel {
        convocation_group::ActiveModel {
            id: Set(id),
            event_id: Set(self.event_id),
            name: Set(self.name),
            athlete_ids: Set(serde_json::Value::from(self.athlete_ids)),
            issued_on: Set(self.issued_on),
            base_fee: Set(self.base_fee),
            race_fee: Set(self.race_fee),
            jump_fee: Set(self.jump_fee),
            relay_fee: Set(self.relay_fee),
            movement_id: Set(self.movement_id),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ConvocationAthleteRecord {
    pub group_id: String,
    pub athlete_id: String,
    #[serde(default)]
    pub races: Vec<String>,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ConvocationAthleteRecord {
    pub fn into_active_model(self) -> convocation_athlete::ActiveModel {
        convocation_athlete::ActiveModel {
            group_id: Set(self.group_id),
            athlete_id: Set(self.athlete_id),
            races: Set(serde_json::Value::from(self.races)),
            confirmed: Set(self.confirmed),
            notes: Set(self.notes),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct MovementRecord {
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Required: only convocation movements are synchronised
    pub convocation_group_id: String,
    #[serde(default)]
    pub event_id: Option<String>,
    pub issued_on: NaiveDate,
    /// Computed from `issued_on` when absent
    #[serde(default)]
    pub due_on: Option<NaiveDate>,
    /// Sum of the item totals when absent
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub status: Option<PaymentStatus>,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub items: Vec<MovementItemRecord>,
}

impl MovementRecord {
    pub fn items_total(&self) -> f64 {
        self.items.iter().map(MovementItemRecord::line_total).sum()
    }

    /// Builds the row with the resolved `due_on`. Items are written separately.
    pub fn to_active_model(
        &self,
        id: String,
        due_on: NaiveDate,
        default_category: &str,
    ) -> movement::ActiveModel {
        let category = self
            .category
            .clone()
            .unwrap_or_else(|| default_category.to_string());

        movement::ActiveModel {
            id: Set(id),
            user_id: Set(self.user_id.clone()),
            convocation_group_id: Set(Some(self.convocation_group_id.clone())),
            event_id: Set(self.event_id.clone()),
            issued_on: Set(self.issued_on),
            due_on: Set(due_on),
            total: Set(self.total.unwrap_or_else(|| self.items_total())),
            status: Set(self.status.unwrap_or(PaymentStatus::Pending)),
            description: Set(self.description.clone()),
            category: Set(Some(category)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct MovementItemRecord {
    pub id: Option<String>,
    pub description: String,
    pub unit_price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default)]
    pub total: Option<f64>,
}

impl MovementItemRecord {
    pub fn line_total(&self) -> f64 {
        self.total
            .unwrap_or_else(|| self.unit_price * f64::from(self.quantity))
    }

    pub fn to_active_model(&self, id: String, movement_id: String) -> movement_item::ActiveModel {
        movement_item::ActiveModel {
            id: Set(id),
            movement_id: Set(movement_id),
            description: Set(self.description.clone()),
            unit_price: Set(self.unit_price),
            quantity: Set(self.quantity),
            total: Set(self.line_total()),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_quantity() -> i32 {
    1
}

fn default_attendance_status() -> String {
    "present".to_string()
}

fn default_convocation_status() -> String {
    "pending".to_string()
}
