//! Shared test utilities for `club-ledger`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        competition,
        event::{self, NewEvent},
        new_id, product, user,
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date.
pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates an active member with no email or age group.
pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> Result<entities::user::Model> {
    user::create_user(db, name.to_string(), None, None).await
}

/// Creates a test event starting on 2024-01-13.
///
/// # Arguments
/// * `db` - Database connection
/// * `creator_id` - Existing user recorded as creator
/// * `registration_fee` - Default fee for race registrations
pub async fn create_test_event(
    db: &DatabaseConnection,
    creator_id: &str,
    registration_fee: Option<f64>,
) -> Result<entities::event::Model> {
    let mut new_event = NewEvent::new(
        "Torneio de Inverno".to_string(),
        ymd(2024, 1, 13),
        creator_id.to_string(),
    );
    new_event.registration_fee = registration_fee;
    event::create_event(db, new_event).await
}

/// Creates an event carrying convocation rates.
///
/// # Defaults
/// * `convocation_fee`: 10.0
/// * `race_fee`: 2.0
/// * `jump_fee`: 0.5
/// * `relay_fee`: 3.0
pub async fn create_convocation_event(
    db: &DatabaseConnection,
    creator_id: &str,
) -> Result<entities::event::Model> {
    let mut new_event = NewEvent::new(
        "Campeonato Regional".to_string(),
        ymd(2024, 1, 13),
        creator_id.to_string(),
    );
    new_event.convocation_fee = Some(10.0);
    new_event.race_fee = Some(2.0);
    new_event.jump_fee = Some(0.5);
    new_event.relay_fee = Some(3.0);
    event::create_event(db, new_event).await
}

/// Creates a test product priced at 4.0 with the given stock.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    stock: i32,
) -> Result<entities::product::Model> {
    product::create_product(db, name.to_string(), 4.0, stock).await
}

/// Inserts a registration row directly, without running the billing cascade.
pub async fn create_test_registration(
    db: &DatabaseConnection,
    race_id: &str,
    athlete_id: &str,
) -> Result<entities::competition_registration::Model> {
    entities::competition_registration::ActiveModel {
        id: Set(new_id()),
        race_id: Set(race_id.to_string()),
        athlete_id: Set(athlete_id.to_string()),
        fee: Set(None),
        invoice_id: Set(None),
        registered_on: Set(ymd(2024, 1, 1)),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// A database holding one event with one competition and one race, plus an athlete.
pub struct RaceFixture {
    pub db: DatabaseConnection,
    pub creator: entities::user::Model,
    pub athlete: entities::user::Model,
    pub event: entities::event::Model,
    pub competition: entities::competition::Model,
    pub race: entities::race::Model,
}

/// Sets up a complete test environment for registration tests.
pub async fn setup_with_race(registration_fee: Option<f64>) -> Result<RaceFixture> {
    let db = setup_test_db().await?;
    let creator = create_test_user(&db, "Direção").await?;
    let athlete = create_test_user(&db, "Ana").await?;
    let event = create_test_event(&db, &creator.id, registration_fee).await?;
    let competition =
        competition::create_competition(&db, &event.id, "Sessão 1".to_string(), ymd(2024, 1, 13))
            .await?;
    let race = competition::create_race(&db, &competition.id, "100m Livres".to_string(), false)
        .await?;
    Ok(RaceFixture {
        db,
        creator,
        athlete,
        event,
        competition,
        race,
    })
}
