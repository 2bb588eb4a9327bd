//! Convocation group business logic and its cost allocation cascade.
//!
//! When a group is created every convoked athlete is charged a movement for:
//!
//! ```text
//! cost = base + race_fee * races + jump_fee * races + relay_fee * relays
//! ```
//!
//! where `races`/`relays` count the athlete's registrations in the event's individual
//! races and relays. Each rate comes from the group, else the event, else zero.
//! Athletes with a non-positive cost are skipped. When the group total is positive
//! an aggregate movement (no user) is written for it and stamped onto the group as
//! `movement_id`, which also marks the group as already allocated.

use crate::{
    config::settings::BillingSettings,
    core::{
        competition::get_races_for_event,
        event::get_event_by_id,
        ledger::{self, MovementDraft},
        new_id,
        user::get_user_by_id,
    },
    entities::{CompetitionRegistration, competition_registration, convocation_group, event},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Input for [`create_convocation_group`]. Fees default to the event's rates.
#[derive(Debug, Clone)]
pub struct NewConvocationGroup {
    pub event_id: String,
    pub name: String,
    pub athlete_ids: Vec<String>,
    pub issued_on: NaiveDate,
    pub base_fee: Option<f64>,
    pub race_fee: Option<f64>,
    pub jump_fee: Option<f64>,
    pub relay_fee: Option<f64>,
}

/// Rates used to price one convoked athlete.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostRates {
    pub base: f64,
    pub per_race: f64,
    pub per_jump: f64,
    pub per_relay: f64,
}

impl CostRates {
    /// Picks each rate from the group, falling back to the event, then zero.
    #[must_use]
    pub fn resolve(group: &convocation_group::Model, event: Option<&event::Model>) -> Self {
        Self {
            base: inherit(group.base_fee, event.and_then(|e| e.convocation_fee)),
            per_race: inherit(group.race_fee, event.and_then(|e| e.race_fee)),
            per_jump: inherit(group.jump_fee, event.and_then(|e| e.jump_fee)),
            per_relay: inherit(group.relay_fee, event.and_then(|e| e.relay_fee)),
        }
    }

    /// Cost of one athlete with `races` individual races and `relays` relays.
    ///
    /// The jump rate is applied to the race count as well.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cost(&self, races: usize, relays: usize) -> f64 {
        let races = races as f64;
        let relays = relays as f64;
        self.base + self.per_race * races + self.per_jump * races + self.per_relay * relays
    }
}

fn inherit(own: Option<f64>, inherited: Option<f64>) -> f64 {
    own.or(inherited).unwrap_or(0.0)
}

/// Creates a convocation group and allocates its costs inside one transaction.
///
/// # Errors
/// Returns an error if:
/// - The group name is empty
/// - Any fee is negative or not finite
/// - The event does not exist
/// - Any insert fails, in which case nothing is written
#[instrument(skip(db, billing))]
pub async fn create_convocation_group(
    db: &DatabaseConnection,
    billing: &BillingSettings,
    new_group: NewConvocationGroup,
) -> Result<convocation_group::Model> {
    if new_group.name.trim().is_empty() {
        return Err(Error::Config {
            message: "Convocation group name cannot be empty".to_string(),
        });
    }

    if let Some(amount) = [
        new_group.base_fee,
        new_group.race_fee,
        new_group.jump_fee,
        new_group.relay_fee,
    ]
    .into_iter()
    .flatten()
    .find(|fee| !fee.is_finite() || *fee < 0.0)
    {
        return Err(Error::InvalidAmount { amount });
    }

    let txn = db.begin().await?;

    if get_event_by_id(&txn, &new_group.event_id).await?.is_none() {
        return Err(Error::EventNotFound {
            id: new_group.event_id,
        });
    }

    let group = convocation_group::ActiveModel {
        id: Set(new_id()),
        event_id: Set(new_group.event_id),
        name: Set(new_group.name.trim().to_string()),
        athlete_ids: Set(serde_json::to_value(&new_group.athlete_ids)?),
        issued_on: Set(new_group.issued_on),
        base_fee: Set(new_group.base_fee),
        race_fee: Set(new_group.race_fee),
        jump_fee: Set(new_group.jump_fee),
        relay_fee: Set(new_group.relay_fee),
        movement_id: Set(None),
        created_at: Set(chrono::Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await?;

    let group = allocate_convocation_costs(&txn, billing, group).await?;

    txn.commit().await?;
    Ok(group)
}

/// Athlete ids stored in a group's JSON roster. Non-string entries are ignored.
#[must_use]
pub fn roster(group: &convocation_group::Model) -> Vec<String> {
    group
        .athlete_ids
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Charges every convoked athlete and writes the group's aggregate movement.
///
/// Returns the group unchanged when it already has a `movement_id`.
#[instrument(skip(db, billing, group), fields(group_id = %group.id))]
pub async fn allocate_convocation_costs<C>(
    db: &C,
    billing: &BillingSettings,
    group: convocation_group::Model,
) -> Result<convocation_group::Model>
where
    C: ConnectionTrait,
{
    if group.movement_id.is_some() {
        debug!("Convocation group already has movements. Skipping.");
        return Ok(group);
    }

    let event = get_event_by_id(db, &group.event_id).await?;
    let rates = CostRates::resolve(&group, event.as_ref());

    let races = get_races_for_event(db, &group.event_id).await?;
    let race_ids: Vec<String> = races.iter().map(|race| race.id.clone()).collect();
    let relay_ids: HashSet<&str> = races
        .iter()
        .filter(|race| race.is_relay)
        .map(|race| race.id.as_str())
        .collect();

    let mut total = 0.0;
    let mut charged = 0;

    for athlete_id in roster(&group) {
        let Some(athlete) = get_user_by_id(db, &athlete_id).await? else {
            warn!("Convoked athlete {} does not exist. Skipping.", athlete_id);
            continue;
        };

        let registrations = CompetitionRegistration::find()
            .filter(competition_registration::Column::AthleteId.eq(athlete.id.as_str()))
            .filter(competition_registration::Column::RaceId.is_in(race_ids.clone()))
            .all(db)
            .await?;
        let relays = registrations
            .iter()
            .filter(|registration| relay_ids.contains(registration.race_id.as_str()))
            .count();
        let individual = registrations.len() - relays;

        let cost = rates.cost(individual, relays);
        if cost <= 0.0 {
            debug!("Athlete {} has no cost. Skipping.", athlete.id);
            continue;
        }

        ledger::issue_movement(
            db,
            billing,
            MovementDraft {
                user_id: Some(athlete.id.clone()),
                convocation_group_id: Some(group.id.clone()),
                event_id: Some(group.event_id.clone()),
                issued_on: group.issued_on,
                description: format!("Convocatória {} - {}", group.name, athlete.name),
                unit_price: cost,
                quantity: 1,
                category: Some(billing.convocation_category.clone()),
            },
        )
        .await?;

        total += cost;
        charged += 1;
    }

    if total <= 0.0 {
        info!("Convocation group {} has no costs to allocate.", group.id);
        return Ok(group);
    }

    let (aggregate, _) = ledger::issue_movement(
        db,
        billing,
        MovementDraft {
            user_id: None,
            convocation_group_id: Some(group.id.clone()),
            event_id: Some(group.event_id.clone()),
            issued_on: group.issued_on,
            description: format!("Convocatória {} - total ({charged} atletas)", group.name),
            unit_price: total,
            quantity: 1,
            category: Some(billing.convocation_category.clone()),
        },
    )
    .await?;

    let mut active: convocation_group::ActiveModel = group.into();
    active.movement_id = Set(Some(aggregate.id.clone()));
    let group = active.update(db).await?;

    info!(
        "Convocation group {} allocated {:.2} across {} athletes",
        group.id, total, charged
    );
    Ok(group)
}
