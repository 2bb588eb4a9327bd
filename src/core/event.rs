//! Event creation and lookup.

use crate::{
    core::{new_id, user::require_user},
    entities::{Event, event},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{ConnectionTrait, Set, prelude::*};
use tracing::{info, instrument};

/// Input for [`create_event`]. Fees default to `None`.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub starts_on: NaiveDate,
    pub created_by: String,
    pub description: Option<String>,
    pub event_type_id: Option<String>,
    pub ends_on: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub registration_fee: Option<f64>,
    pub convocation_fee: Option<f64>,
    pub race_fee: Option<f64>,
    pub jump_fee: Option<f64>,
    pub relay_fee: Option<f64>,
}

impl NewEvent {
    /// Starts an event with only the required fields set.
    #[must_use]
    pub const fn new(title: String, starts_on: NaiveDate, created_by: String) -> Self {
        Self {
            title,
            starts_on,
            created_by,
            description: None,
            event_type_id: None,
            ends_on: None,
            start_time: None,
            location: None,
            registration_fee: None,
            convocation_fee: None,
            race_fee: None,
            jump_fee: None,
            relay_fee: None,
        }
    }

    fn fees(&self) -> [Option<f64>; 5] {
        [
            self.registration_fee,
            self.convocation_fee,
            self.race_fee,
            self.jump_fee,
            self.relay_fee,
        ]
    }
}

/// Creates an event after checking its title, fees and creator.
///
/// # Errors
/// Returns an error if:
/// - The title is empty
/// - Any fee is negative or not finite
/// - The creator does not exist
#[instrument(skip(db))]
pub async fn create_event(db: &DatabaseConnection, new_event: NewEvent) -> Result<event::Model> {
    if new_event.title.trim().is_empty() {
        return Err(Error::Config {
            message: "Event title cannot be empty".to_string(),
        });
    }

    if let Some(amount) = new_event
        .fees()
        .into_iter()
        .flatten()
        .find(|fee| !fee.is_finite() || *fee < 0.0)
    {
        return Err(Error::InvalidAmount { amount });
    }

    require_user(db, &new_event.created_by).await?;

    let event = event::ActiveModel {
        id: Set(new_id()),
        title: Set(new_event.title.trim().to_string()),
        description: Set(new_event.description),
        event_type_id: Set(new_event.event_type_id),
        starts_on: Set(new_event.starts_on),
        ends_on: Set(new_event.ends_on),
        start_time: Set(new_event.start_time),
        location: Set(new_event.location),
        registration_fee: Set(new_event.registration_fee),
        convocation_fee: Set(new_event.convocation_fee),
        race_fee: Set(new_event.race_fee),
        jump_fee: Set(new_event.jump_fee),
        relay_fee: Set(new_event.relay_fee),
        created_by: Set(new_event.created_by),
        created_at: Set(chrono::Utc::now().naive_utc()),
    }
    .insert(db)
    .await?;

    info!("Created event '{}' ({})", event.title, event.id);
    Ok(event)
}

/// Finds an event by id.
pub async fn get_event_by_id<C>(db: &C, event_id: &str) -> Result<Option<event::Model>>
where
    C: ConnectionTrait,
{
    Event::find_by_id(event_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}
