//! Competitions and races (provas).

use crate::{
    core::{event::get_event_by_id, new_id},
    entities::{Competition, Race, competition, race},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Set, prelude::*};

/// Creates a competition inside an existing event.
pub async fn create_competition(
    db: &DatabaseConnection,
    event_id: &str,
    name: String,
    held_on: NaiveDate,
) -> Result<competition::Model> {
    if get_event_by_id(db, event_id).await?.is_none() {
        return Err(Error::EventNotFound {
            id: event_id.to_string(),
        });
    }

    competition::ActiveModel {
        id: Set(new_id()),
        event_id: Set(event_id.to_string()),
        name: Set(name),
        held_on: Set(held_on),
        location: Set(None),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a race in an existing competition.
pub async fn create_race(
    db: &DatabaseConnection,
    competition_id: &str,
    name: String,
    is_relay: bool,
) -> Result<race::Model> {
    if Competition::find_by_id(competition_id.to_string())
        .one(db)
        .await?
        .is_none()
    {
        return Err(Error::Config {
            message: format!("Competition {competition_id} does not exist"),
        });
    }

    race::ActiveModel {
        id: Set(new_id()),
        competition_id: Set(competition_id.to_string()),
        name: Set(name),
        distance: Set(None),
        style: Set(None),
        gender: Set(None),
        age_group: Set(None),
        is_relay: Set(is_relay),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds a race by id.
pub async fn get_race_by_id<C>(db: &C, race_id: &str) -> Result<Option<race::Model>>
where
    C: ConnectionTrait,
{
    Race::find_by_id(race_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every race of every competition held under `event_id`.
pub async fn get_races_for_event<C>(db: &C, event_id: &str) -> Result<Vec<race::Model>>
where
    C: ConnectionTrait,
{
    let competition_ids: Vec<String> = Competition::find()
        .filter(competition::Column::EventId.eq(event_id))
        .all(db)
        .await?
        .into_iter()
        .map(|competition| competition.id)
        .collect();

    Race::find()
        .filter(race::Column::CompetitionId.is_in(competition_ids))
        .all(db)
        .await
        .map_err(Into::into)
}
