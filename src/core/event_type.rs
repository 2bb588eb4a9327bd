//! Event type catalogue and seeding from config.toml.

use crate::{
    config::settings::EventTypeConfig,
    core::new_id,
    entities::{EventType, event_type},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info, instrument};

/// Lists all event types ordered by name.
pub async fn get_all_event_types(db: &DatabaseConnection) -> Result<Vec<event_type::Model>> {
    EventType::find()
        .order_by_asc(event_type::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts the configured event types whose names are not in the table yet.
///
/// Existing types are left untouched, so the seed can run on every start.
/// Returns the number of inserted types.
#[instrument(skip(db, configs))]
pub async fn seed_event_types(
    db: &DatabaseConnection,
    configs: &[EventTypeConfig],
) -> Result<usize> {
    info!(
        "Seeding event types. Found {} configurations from TOML.",
        configs.len()
    );
    let mut inserted = 0;

    for config in configs {
        let existing = EventType::find()
            .filter(event_type::Column::Name.eq(config.name.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            debug!("Event type '{}' already exists. Skipping.", config.name);
            continue;
        }

        event_type::ActiveModel {
            id: Set(new_id()),
            name: Set(config.name.clone()),
            category: Set(config.category.clone()),
            color: Set(config.color.clone()),
            active: Set(true),
        }
        .insert(db)
        .await?;
        inserted += 1;
    }

    info!("Seeded {} new event types.", inserted);
    Ok(inserted)
}
