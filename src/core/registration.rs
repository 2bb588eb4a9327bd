//! Competition registration business logic and its billing cascade.
//!
//! Registering an athlete for a race bills them once: an invoice, its item and the
//! mirrored revenue entry are written in the same transaction as the registration,
//! and the invoice id is stamped back onto the registration. A registration that
//! already carries an `invoice_id` is never billed again.
//!
//! The fee is resolved in order from the registration's own `fee`, the event's
//! `registration_fee`, and finally zero.

use crate::{
    config::settings::BillingSettings,
    core::{
        competition::get_race_by_id,
        event::get_event_by_id,
        ledger::{self, InvoiceDraft},
        new_id,
        user::require_user,
    },
    entities::{Competition, competition_registration, event},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};
use tracing::{debug, info, instrument};

/// Input for [`create_registration`].
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub race_id: String,
    pub athlete_id: String,
    pub registered_on: NaiveDate,
    /// Overrides the event's registration fee
    pub fee: Option<f64>,
    /// Invoice already issued elsewhere; suppresses billing
    pub invoice_id: Option<String>,
}

/// Creates a registration and bills it inside one transaction.
///
/// # Errors
/// Returns an error if:
/// - The fee override is negative or not finite
/// - The race or the athlete does not exist
/// - Any insert fails, in which case nothing is written
#[instrument(skip(db, billing))]
pub async fn create_registration(
    db: &DatabaseConnection,
    billing: &BillingSettings,
    new_registration: NewRegistration,
) -> Result<competition_registration::Model> {
    if let Some(fee) = new_registration.fee {
        if fee < 0.0 || !fee.is_finite() {
            return Err(Error::InvalidAmount { amount: fee });
        }
    }

    let txn = db.begin().await?;

    if get_race_by_id(&txn, &new_registration.race_id).await?.is_none() {
        return Err(Error::RaceNotFound {
            id: new_registration.race_id,
        });
    }
    require_user(&txn, &new_registration.athlete_id).await?;

    let registration = competition_registration::ActiveModel {
        id: Set(new_id()),
        race_id: Set(new_registration.race_id),
        athlete_id: Set(new_registration.athlete_id),
        fee: Set(new_registration.fee),
        invoice_id: Set(new_registration.invoice_id),
        registered_on: Set(new_registration.registered_on),
    }
    .insert(&txn)
    .await?;

    let registration = bill_registration(&txn, billing, registration).await?;

    txn.commit().await?;
    Ok(registration)
}

/// Issues the invoice for a freshly created registration and stamps its id.
///
/// Returns the registration unchanged when it already has an invoice.
#[instrument(skip(db, billing, registration), fields(registration_id = %registration.id))]
pub async fn bill_registration<C>(
    db: &C,
    billing: &BillingSettings,
    registration: competition_registration::Model,
) -> Result<competition_registration::Model>
where
    C: ConnectionTrait,
{
    if registration.invoice_id.is_some() {
        debug!("Registration already invoiced. Skipping.");
        return Ok(registration);
    }

    let race = get_race_by_id(db, &registration.race_id).await?;
    let event = match &race {
        Some(race) => resolve_event(db, &race.competition_id).await?,
        None => None,
    };

    let amount = registration_fee(&registration, event.as_ref());
    let race_name = race.as_ref().map_or("?", |race| race.name.as_str());
    let description = match &event {
        Some(event) => format!("Inscrição {race_name} - {}", event.title),
        None => format!("Inscrição {race_name}"),
    };

    let issued = ledger::issue_invoice(
        db,
        billing,
        InvoiceDraft {
            user_id: registration.athlete_id.clone(),
            issued_on: registration.registered_on,
            kind: "registration".to_string(),
            description,
            unit_price: amount,
            quantity: 1,
            total: amount,
            category: billing.registration_category.clone(),
        },
    )
    .await?;

    let mut active: competition_registration::ActiveModel = registration.into();
    active.invoice_id = Set(Some(issued.invoice.id.clone()));
    let registration = active.update(db).await?;

    info!(
        "Registration {} invoiced as {} ({:.2})",
        registration.id, issued.invoice.id, amount
    );
    Ok(registration)
}

async fn resolve_event<C>(db: &C, competition_id: &str) -> Result<Option<event::Model>>
where
    C: ConnectionTrait,
{
    let Some(competition) = Competition::find_by_id(competition_id.to_string())
        .one(db)
        .await?
    else {
        return Ok(None);
    };
    get_event_by_id(db, &competition.event_id).await
}

/// Fee charged for a registration: its own override, else the event default, else zero.
#[must_use]
pub fn registration_fee(
    registration: &competition_registration::Model,
    event: Option<&event::Model>,
) -> f64 {
    registration
        .fee
        .or_else(|| event.and_then(|event| event.registration_fee))
        .unwrap_or(0.0)
}
